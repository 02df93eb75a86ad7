//! Cache key layout: `<slice>:<qualifier>`.

use roadsafe_core::SubjectType;

pub const DEBTS: &str = "debts:";
pub const FINES: &str = "fines:";
pub const REWARDS: &str = "rewards:";
pub const VEHICLES: &str = "vehicles:";
pub const LICENSES: &str = "licenses:";

pub fn debts() -> String {
    format!("{}all", DEBTS)
}

pub fn fines_page(page: u32) -> String {
    format!("{}page:{}", FINES, page)
}

pub fn rewards() -> String {
    format!("{}all", REWARDS)
}

pub fn vehicles() -> String {
    format!("{}all", VEHICLES)
}

pub fn licenses() -> String {
    format!("{}all", LICENSES)
}

/// Slice family touched by paying a subject of this type.
pub fn family_for(kind: SubjectType) -> &'static str {
    match kind {
        SubjectType::Debt => DEBTS,
        SubjectType::Fine => FINES,
    }
}
