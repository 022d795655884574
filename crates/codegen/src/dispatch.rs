//! C dispatch code for the DataPool.
//!
//! The header enumerates the data types present in the registry and declares
//! two lookups keyed by composite ID; the source implements them as switches.
//! Unknown IDs fall through to a `default:` returning `false`.

use std::fmt::Write;

use dpgen_registry::{DataPool, ParameterEntry};


pub const HEADER_FILE: &str = "DataPool_generated.h";
pub const SOURCE_FILE: &str = "DataPool_generated.c";

const GUARD: &str = "H_DATAPOOL_GENERATED_H";
const TYPE_TAG_PREFIX: &str = "DATAPOOL_DATATYPE_";
const RULE: &str = "/* -------------------------------------------------------------------------";
const RULE_END: &str = " * ------------------------------------------------------------------------- */";

/// Include paths written into the generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
	/// Header declaring the DataPool global.
	pub public_include: String,
	/// Path the generated header is included by.
	pub generated_include: String,
}

impl Default for DispatchOptions {
	fn default() -> Self {
		Self {
			public_include: "system/data_pool/DataPool_public.h".to_string(),
			generated_include: format!("system/data_pool/{HEADER_FILE}"),
		}
	}
}

/// Enum constant naming a data type, e.g. `DATAPOOL_DATATYPE_UINT8_T`.
pub fn type_tag(ty: &str) -> String {
	let words: Vec<String> = ty
		.replace('*', " PTR ")
		.split_whitespace()
		.map(|w| {
			w.chars()
				.map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
				.collect()
		})
		.collect();
	format!("{TYPE_TAG_PREFIX}{}", words.join("_"))
}

fn banner(out: &mut String, file: &str, pool: &DataPool) {
	let _ = writeln!(out, "/**");
	let _ = writeln!(out, " * @file {file}");
	let _ = writeln!(out, " * @author Generated by dpgen");
	let _ = writeln!(out, " * @brief Generated code to assist with DataPool usage.");
	let _ = writeln!(out, " *");
	let _ = writeln!(out, " * This file was generated from {}. Do not edit.", pool.source);
	let _ = writeln!(out, " *");
	let _ = writeln!(out, " * @version Generated from {} version {}", pool.source, pool.version);
	let _ = writeln!(out, " */");
	let _ = writeln!(out);
}

fn section(out: &mut String, title: &str) {
	let _ = writeln!(out, "{RULE}");
	let _ = writeln!(out, " * {title}");
	let _ = writeln!(out, "{RULE_END}");
	let _ = writeln!(out);
}

fn get_signature(out: &mut String) {
	let _ = writeln!(out, "bool DataPool_get(");
	let _ = writeln!(out, "    DataPool_Id id_in,");
	let _ = writeln!(out, "    void **pp_data_out,");
	let _ = writeln!(out, "    DataPool_DataType *p_data_type_out,");
	let _ = writeln!(out, "    size_t *p_data_size_out");
	let _ = write!(out, ")");
}

fn symbol_signature(out: &mut String) {
	let _ = writeln!(out, "bool DataPool_get_symbol_str(");
	let _ = writeln!(out, "    DataPool_Id id_in,");
	let _ = writeln!(out, "    char **pp_symbol_str_out");
	let _ = write!(out, ")");
}

/// Renders `DataPool_generated.h`.
pub fn render_header(pool: &DataPool) -> String {
	let mut out = String::new();
	banner(&mut out, HEADER_FILE, pool);
	let _ = writeln!(out, "#ifndef {GUARD}");
	let _ = writeln!(out, "#define {GUARD}");
	let _ = writeln!(out);

	section(&mut out, "INCLUDES");
	let _ = writeln!(out, "/* Standard library includes */");
	for std_header in ["stdint.h", "stdbool.h", "stddef.h"] {
		let _ = writeln!(out, "#include <{std_header}>");
	}
	let _ = writeln!(out);
	if !pool.includes.is_empty() {
		let _ = writeln!(out, "/* Internal includes */");
		for include in &pool.includes {
			let _ = writeln!(out, "#include \"{include}\"");
		}
		let _ = writeln!(out);
	}

	section(&mut out, "TYPES");
	let _ = writeln!(out, "/**");
	let _ = writeln!(out, " * @brief Type representing an ID to access the DataPool.");
	let _ = writeln!(out, " */");
	let _ = writeln!(out, "typedef uint16_t DataPool_Id;");
	let _ = writeln!(out);

	section(&mut out, "ENUMS");
	let _ = writeln!(out, "/**");
	let _ = writeln!(out, " * @brief Types of data that are contained in the DataPool.");
	let _ = writeln!(out, " */");
	let _ = writeln!(out, "typedef enum _DataPool_DataType {{");
	let mut tags: Vec<String> = pool.registry.data_types().into_iter().map(type_tag).collect();
	if tags.is_empty() {
		tags.push(format!("{TYPE_TAG_PREFIX}NONE"));
	}
	let _ = writeln!(out, "    {}", tags.join(",\n    "));
	let _ = writeln!(out, "}} DataPool_DataType;");
	let _ = writeln!(out);

	section(&mut out, "FUNCTIONS");
	let _ = writeln!(out, "/**");
	let _ = writeln!(out, " * @brief Get a pointer to the DataPool parameter associated with the given ID,");
	let _ = writeln!(out, " * as well as the type of the data and the number of bytes the data occupies.");
	let _ = writeln!(out, " *");
	let _ = writeln!(out, " * @param id_in The ID of the DataPool parameter.");
	let _ = writeln!(out, " * @param pp_data_out Output pointer to a pointer to the parameter.");
	let _ = writeln!(out, " * @param p_data_type_out Output pointer to the data type of the parameter.");
	let _ = writeln!(out, " * @param p_data_size_out Output pointer to the size (in bytes) of the parameter.");
	let _ = writeln!(out, " * @return bool True if successful, false if the ID is invalid.");
	let _ = writeln!(out, " */");
	get_signature(&mut out);
	let _ = writeln!(out, ";");
	let _ = writeln!(out);
	let _ = writeln!(out, "/**");
	let _ = writeln!(out, " * @brief Get the symbol name of the DataPool parameter with the given ID.");
	let _ = writeln!(out, " *");
	let _ = writeln!(out, " * The caller is responsible for freeing the returned string.");
	let _ = writeln!(out, " *");
	let _ = writeln!(out, " * @param id_in The ID of the DataPool parameter.");
	let _ = writeln!(out, " * @param pp_symbol_str_out Output pointer to the allocated symbol string.");
	let _ = writeln!(out, " * @return bool True if successful, false if the ID is invalid.");
	let _ = writeln!(out, " */");
	symbol_signature(&mut out);
	let _ = writeln!(out, ";");
	let _ = writeln!(out);
	let _ = writeln!(out, "#endif /* {GUARD} */");
	out
}

/// Renders `DataPool_generated.c`.
pub fn render_source(pool: &DataPool, options: &DispatchOptions) -> String {
	let mut out = String::new();
	banner(&mut out, SOURCE_FILE, pool);

	section(&mut out, "INCLUDES");
	let _ = writeln!(out, "/* Standard library includes */");
	let _ = writeln!(out, "#include <stdlib.h>");
	let _ = writeln!(out, "#include <string.h>");
	let _ = writeln!(out);
	let _ = writeln!(out, "/* Internal includes */");
	let _ = writeln!(out, "#include \"{}\"", options.public_include);
	let _ = writeln!(out, "#include \"{}\"", options.generated_include);
	let _ = writeln!(out);

	section(&mut out, "FUNCTIONS");
	get_signature(&mut out);
	let _ = writeln!(out, " {{");
	switch(&mut out, pool.registry.entries(), |out, entry| {
		let _ = writeln!(out, "        *pp_data_out = &{};", entry.symbol);
		let _ = writeln!(out, "        *p_data_type_out = {};", type_tag(&entry.data_type));
		let _ = writeln!(out, "        *p_data_size_out = sizeof({});", entry.symbol);
	});
	let _ = writeln!(out);

	symbol_signature(&mut out);
	let _ = writeln!(out, " {{");
	switch(&mut out, pool.registry.entries(), |out, entry| {
		let _ = writeln!(out, "        *pp_symbol_str_out = strdup(\"{}\");", entry.symbol);
	});
	out
}

fn switch(out: &mut String, entries: &[ParameterEntry], mut case: impl FnMut(&mut String, &ParameterEntry)) {
	let _ = writeln!(out, "    switch (id_in) {{");
	for entry in entries {
		let _ = writeln!(out);
		let _ = writeln!(out, "    /* {}{} */", entry.symbol, entry.array.as_deref().unwrap_or(""));
		let _ = writeln!(out, "    case {:#06x}:", entry.composite_id);
		case(out, entry);
		let _ = writeln!(out, "        return true;");
	}
	let _ = writeln!(out);
	let _ = writeln!(out, "    default:");
	let _ = writeln!(out, "        return false;");
	let _ = writeln!(out, "    }}");
	let _ = writeln!(out, "}}");
}
