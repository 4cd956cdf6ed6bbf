//! Lookup operators applied to cell values.
//!
//! Composed filter keys end in the lower-case name of a [`Lookup`]:
//!
//! [`Lookup`]     | Name         | Behavior
//! ---------------|--------------|-----------------------------------------
//! `Exact`        | `exact`      | equality
//! `IExact`       | `iexact`     | case-insensitive equality on the text form
//! `Contains`     | `contains`   | substring on the text form
//! `IContains`    | `icontains`  | case-insensitive substring
//! `StartsWith`   | `startswith` | prefix on the text form
//! `EndsWith`     | `endswith`   | suffix on the text form
//! `Lt`           | `lt`         | strictly less than
//! `Lte`          | `lte`        | less than or equal
//! `Gt`           | `gt`         | strictly greater than
//! `Gte`          | `gte`        | greater than or equal
//! `IsNull`       | `isnull`     | the record has no value at the path
//!
//! Numbers compare numerically, strings lexically; mixed-type order
//! comparisons never match.

use core::cmp::Ordering;

use crate::row::CellValue;

/// A lookup operator name, as it appears in composed filter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Lookup {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    EndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
}

impl Lookup {
    /// Build the operator for this lookup, with `target` as its right
    /// hand side.
    pub fn instantiate(&self, target: CellValue) -> Box<dyn Operator> {
        match self {
            Lookup::Exact => Box::new(ExactImpl { target }),
            Lookup::IExact => Box::new(IExactImpl {
                target: target.to_string().to_lowercase(),
            }),
            Lookup::Contains => Box::new(ContainsImpl {
                target: target.to_string(),
            }),
            Lookup::IContains => Box::new(IContainsImpl {
                target: target.to_string().to_lowercase(),
            }),
            Lookup::StartsWith => Box::new(StartsWithImpl {
                target: target.to_string(),
            }),
            Lookup::EndsWith => Box::new(EndsWithImpl {
                target: target.to_string(),
            }),
            Lookup::Lt => Box::new(LessImpl { target }),
            Lookup::Lte => Box::new(LessEqImpl { target }),
            Lookup::Gt => Box::new(GreaterImpl { target }),
            Lookup::Gte => Box::new(GreaterEqImpl { target }),
            Lookup::IsNull => Box::new(IsNullImpl {
                target: match target {
                    CellValue::Bool(want) => want,
                    _ => true,
                },
            }),
        }
    }
}

/// Take a single cell value and produce a true/false result.
pub trait Operator {
    /// Apply this operator to one cell value.
    fn apply(&self, value: &CellValue) -> bool;
    /// The result for a record with no cell at the target path. `false`
    /// for everything except `isnull` filtering for absence.
    fn absent(&self) -> bool {
        false
    }
}

fn compare(value: &CellValue, target: &CellValue) -> Option<Ordering> {
    match (value, target) {
        (CellValue::Number(a), CellValue::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
        (CellValue::String(a), CellValue::String(b)) => Some(a.cmp(b)),
        (CellValue::Bool(a), CellValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Match when the value equals the target.
pub struct ExactImpl {
    target: CellValue,
}

impl Operator for ExactImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value == &self.target
    }
}

/// Match when the text form of the value equals the target, case
/// insensitively.
pub struct IExactImpl {
    target: String,
}

impl Operator for IExactImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.to_string().to_lowercase() == self.target
    }
}

/// Match when the text form of the value contains the target.
pub struct ContainsImpl {
    target: String,
}

impl Operator for ContainsImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.to_string().contains(&self.target)
    }
}

/// Match when the text form of the value contains the target, case
/// insensitively.
pub struct IContainsImpl {
    target: String,
}

impl Operator for IContainsImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.to_string().to_lowercase().contains(&self.target)
    }
}

/// Match when the text form of the value starts with the target.
pub struct StartsWithImpl {
    target: String,
}

impl Operator for StartsWithImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.to_string().starts_with(&self.target)
    }
}

/// Match when the text form of the value ends with the target.
pub struct EndsWithImpl {
    target: String,
}

impl Operator for EndsWithImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.to_string().ends_with(&self.target)
    }
}

/// Match when the value orders strictly before the target.
pub struct LessImpl {
    target: CellValue,
}

impl Operator for LessImpl {
    fn apply(&self, value: &CellValue) -> bool {
        compare(value, &self.target) == Some(Ordering::Less)
    }
}

/// Match when the value orders before or equal to the target.
pub struct LessEqImpl {
    target: CellValue,
}

impl Operator for LessEqImpl {
    fn apply(&self, value: &CellValue) -> bool {
        matches!(
            compare(value, &self.target),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )
    }
}

/// Match when the value orders strictly after the target.
pub struct GreaterImpl {
    target: CellValue,
}

impl Operator for GreaterImpl {
    fn apply(&self, value: &CellValue) -> bool {
        compare(value, &self.target) == Some(Ordering::Greater)
    }
}

/// Match when the value orders after or equal to the target.
pub struct GreaterEqImpl {
    target: CellValue,
}

impl Operator for GreaterEqImpl {
    fn apply(&self, value: &CellValue) -> bool {
        matches!(
            compare(value, &self.target),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )
    }
}

/// Match on the presence or absence of a value.
pub struct IsNullImpl {
    target: bool,
}

impl Operator for IsNullImpl {
    fn apply(&self, value: &CellValue) -> bool {
        value.is_null() == self.target
    }
    fn absent(&self) -> bool {
        self.target
    }
}
