use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::error::ErrorKind;

const MODULE_IDS: &str = r#"/**
 * @file Kernel_module_ids.h
 * @brief Module ID definitions.
 *
 * @version 0.1
 */

#define KERNEL_MOD_ID_SHIFT (10)

/**
 * @brief Kernel module (system group) ID.
 */
#define MOD_ID_KERNEL ((ModuleId)(0x01 << KERNEL_MOD_ID_SHIFT))

/**
 * @brief Eps module (components group) ID.
 */
#define MOD_ID_EPS ((ModuleId)(0x02 << KERNEL_MOD_ID_SHIFT))

/* OpModeManager module (applications group) */
#define MOD_ID_OPMODEMANAGER ((ModuleId)(0x0A << KERNEL_MOD_ID_SHIFT))

/* OpModeManager module (applications group) */
#define MOD_ID_OPMODEMANAGER_EXT ((ModuleId)(0x0B << KERNEL_MOD_ID_SHIFT))
"#;

fn table(text: &str) -> Result<ModuleTable, Error> {
	let file = SourceFile::new("system/kernel/Kernel_module_ids.h", text);
	ModuleTable::parse(&file, IdLayout::default(), DEFAULT_SHIFT_SYMBOL)
}

#[test]
fn parses_modules_in_table_order() {
	let table = table(MODULE_IDS).unwrap();
	let symbols: Vec<_> = table.iter().map(|m| m.symbol.as_str()).collect();
	assert_eq!(
		symbols,
		vec!["MOD_ID_KERNEL", "MOD_ID_EPS", "MOD_ID_OPMODEMANAGER", "MOD_ID_OPMODEMANAGER_EXT"]
	);

	let eps = table.by_symbol("MOD_ID_EPS").unwrap();
	assert_eq!(
		eps,
		&ModuleEntry {
			symbol: "MOD_ID_EPS".to_string(),
			module_name: "Eps".to_string(),
			group_name: "components".to_string(),
			raw_id: 0x02,
			shifted_id: 0x0800,
		}
	);
	assert_eq!(table.by_raw_id(0x0A).map(|m| m.symbol.as_str()), Some("MOD_ID_OPMODEMANAGER"));
	assert_eq!(table.by_raw_id(0x3F), None);
}

#[rstest]
#[case("MOD_ID_EPS")]
#[case("EPS")]
#[case("Eps")]
#[case("eps")]
fn resolves_module_references(#[case] name: &str) {
	let table = table(MODULE_IDS).unwrap();
	assert_eq!(table.resolve(name).map(|m| m.raw_id), Some(0x02));
}

#[test]
fn unknown_module_does_not_resolve() {
	let table = table(MODULE_IDS).unwrap();
	assert!(table.resolve("XYZ").is_none());
}

#[test]
fn repeated_module_name_owns_several_blocks() {
	let table = table(MODULE_IDS).unwrap();
	assert_eq!(table.blocks("OpModeManager"), vec![0x0A, 0x0B]);
	assert_eq!(table.blocks("Eps"), vec![0x02]);
	assert!(table.blocks("Missing").is_empty());
}

#[test]
fn missing_shift_is_a_parse_error() {
	let text = MODULE_IDS.replace("#define KERNEL_MOD_ID_SHIFT (10)", "");
	let err = table(&text).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Parse);
	assert!(err.to_string().contains("KERNEL_MOD_ID_SHIFT"), "{err}");
}

#[test]
fn shift_must_match_layout() {
	let text = MODULE_IDS.replace("(10)", "(8)");
	let err = table(&text).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Schema);
	assert!(matches!(
		err,
		Error::Schema {
			source: SchemaError::ShiftMismatch { shift: 8, index_bits: 10 },
			..
		}
	));
}

#[test]
fn custom_shift_symbol() {
	let text = MODULE_IDS.replace("KERNEL_MOD_ID_SHIFT", "MOD_SHIFT");
	let file = SourceFile::new("ids.h", text);
	let table = ModuleTable::parse(&file, IdLayout::default(), "MOD_SHIFT").unwrap();
	assert_eq!(table.len(), 4);
}

#[test]
fn module_comment_without_hex_id_is_a_parse_error() {
	let text = format!("{MODULE_IDS}\n/* Broken module (misc group) */\n#define MOD_ID_BROKEN (7)\n");
	assert_eq!(table(&text).unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn module_id_must_fit_the_layout() {
	let text = format!("{MODULE_IDS}\n/* Wide module (misc group) */\n#define MOD_ID_WIDE ((ModuleId)(0x40))\n");
	let err = table(&text).unwrap_err();
	assert_eq!(
		err.to_string(),
		format!(
			"system/kernel/Kernel_module_ids.h: {}",
			AllocationError::ModuleIdOutOfRange {
				symbol: "MOD_ID_WIDE".to_string(),
				id: 0x40,
				bits: 6,
			}
		)
	);
	assert_eq!(err.kind(), ErrorKind::Allocation);
}

#[test]
fn duplicate_raw_ids_are_rejected() {
	let text = format!("{MODULE_IDS}\n/* Clash module (misc group) */\n#define MOD_ID_CLASH ((ModuleId)(0x02))\n");
	let err = table(&text).unwrap_err();
	assert!(matches!(
		err,
		Error::Allocation {
			source: AllocationError::DuplicateModuleId { id: 0x02, ref first, ref second },
			..
		} if first == "MOD_ID_EPS" && second == "MOD_ID_CLASH"
	));
}

#[test]
fn insert_computes_shifted_id() {
	let layout = IdLayout::new(12, 4).unwrap();
	let mut table = ModuleTable::empty(layout);
	table
		.insert(ModuleEntry {
			symbol: "MOD_ID_A".to_string(),
			module_name: "A".to_string(),
			group_name: "g".to_string(),
			raw_id: 3,
			shifted_id: 0,
		})
		.unwrap();
	assert_eq!(table.by_raw_id(3).unwrap().shifted_id, 3 << 12);
	assert!(!table.is_empty());
}
