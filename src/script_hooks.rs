//! The closed table of well-known "script hook" function names the engine
//! invokes by call-in/call-out convention, plus the per-weapon families and
//! legacy aliases.
//!
//! Grounded on `original_source/script_hook_function.py`.

pub const MAX_WEAPONS_PER_UNIT: u32 = 32;

/// Non-weapon call-in/call-out functions, in index order starting at 0.
pub const UNIT_FUNCTIONS: &[&str] = &[
    "Create",
    "Destroy",
    "StartMoving",
    "StopMoving",
    "Activate",
    "Killed",
    "Deactivate",
    "SetDirection",
    "SetSpeed",
    "RockUnit",
    "HitByWeapon",
    "MoveRate0",
    "MoveRate1",
    "MoveRate2",
    "MoveRate3",
    "setSFXoccupy",
    "HitByWeaponId",
    "QueryLandingPadCount",
    "QueryLandingPad",
    "Falling",
    "Landed",
    "BeginTransport",
    "QueryTransport",
    "TransportPickup",
    "StartUnload",
    "EndTransport",
    "TransportDrop",
    "SetMaxReloadTime",
    "StartBuilding",
    "StopBuilding",
    "QueryNanoPiece",
    "QueryBuildInfo",
    "Go",
];

/// Per-weapon function name templates (`{}` is replaced with `weapon_idx + 1`).
const WEAPON_FUNCTIONS: &[&str] = &[
    "QueryWeapon{}",
    "AimWeapon{}",
    "AimFromWeapon{}",
    "FireWeapon{}",
    "EndBurst{}",
    "Shot{}",
    "BlockShot{}",
    "TargetWeight{}",
];

/// Index of the first weapon-function slot (one past the last unit function).
pub const FUNC_LAST: u32 = UNIT_FUNCTIONS.len() as u32;
const NUM_WEAPON_FUNCS: u32 = WEAPON_FUNCTIONS.len() as u32;
pub const NUM_UNIT_FUNCS: u32 = FUNC_LAST + MAX_WEAPONS_PER_UNIT * NUM_WEAPON_FUNCS;

/// `Primary`/`Secondary`/`Tertiary` legacy aliases map to weapon index 0/1/2
/// of the named family.
const LEGACY_FAMILIES: &[(&str, usize)] = &[
    ("Query", 0),
    ("Aim", 1),
    ("AimFrom", 2),
    ("Fire", 3),
];
const LEGACY_SUFFIXES: &[(&str, usize)] = &[("Primary", 0), ("Secondary", 1), ("Tertiary", 2)];

/// Returns the full ordered list of script-hook function names (unit
/// functions followed by all weapon functions for weapons 1..=32).
pub fn all_function_names() -> Vec<String> {
    let mut names: Vec<String> = UNIT_FUNCTIONS.iter().map(|s| s.to_string()).collect();
    for weapon_idx in 0..MAX_WEAPONS_PER_UNIT {
        for template in WEAPON_FUNCTIONS {
            names.push(template.replace("{}", &(weapon_idx + 1).to_string()));
        }
    }
    names
}

/// `name -> call-in index`, including legacy `Primary`/`Secondary`/`Tertiary` aliases.
pub fn function_number(name: &str) -> Option<u32> {
    if let Some(idx) = UNIT_FUNCTIONS.iter().position(|n| *n == name) {
        return Some(idx as u32);
    }

    for (family_prefix, family_offset) in LEGACY_FAMILIES {
        for (suffix, weapon_idx) in LEGACY_SUFFIXES {
            if name == format!("{family_prefix}{suffix}") {
                return Some(FUNC_LAST + (*weapon_idx as u32) * NUM_WEAPON_FUNCS + *family_offset as u32);
            }
        }
    }

    for weapon_idx in 0..MAX_WEAPONS_PER_UNIT {
        for (template_idx, template) in WEAPON_FUNCTIONS.iter().enumerate() {
            if name == template.replace("{}", &(weapon_idx + 1).to_string()) {
                return Some(FUNC_LAST + weapon_idx * NUM_WEAPON_FUNCS + template_idx as u32);
            }
        }
    }

    None
}

/// `call-in index -> name` (canonical name, never a legacy alias).
pub fn function_name(number: u32) -> Option<String> {
    all_function_names().get(number as usize).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_function_indices_match_declaration_order() {
        assert_eq!(function_number("Create"), Some(0));
        assert_eq!(function_number("Go"), Some(32));
    }

    #[test]
    fn weapon_function_indices_follow_unit_functions() {
        assert_eq!(function_number("QueryWeapon1"), Some(FUNC_LAST));
        assert_eq!(function_number("AimWeapon1"), Some(FUNC_LAST + 1));
        assert_eq!(function_number("QueryWeapon2"), Some(FUNC_LAST + NUM_WEAPON_FUNCS));
    }

    #[test]
    fn legacy_aliases_match_canonical_weapon_names() {
        for (legacy, canonical) in [
            ("QueryPrimary", "QueryWeapon1"),
            ("QuerySecondary", "QueryWeapon2"),
            ("QueryTertiary", "QueryWeapon3"),
            ("AimPrimary", "AimWeapon1"),
            ("FirePrimary", "FireWeapon1"),
        ] {
            assert_eq!(function_number(legacy), function_number(canonical), "{legacy}");
        }
    }

    #[test]
    fn total_function_count_matches_formula() {
        assert_eq!(all_function_names().len() as u32, NUM_UNIT_FUNCS);
    }
}
