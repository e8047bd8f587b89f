//! Request validation helpers.
//!
//! Turns `validator` output into the single `"<field> is <tag>"` message
//! returned to clients.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// A request body whose rules run on its normalized form.
pub trait RequestBody: Validate + Sized {
    /// Dotted field paths in declaration order. Violations are reported in
    /// this order; unlisted paths sort last.
    const FIELD_ORDER: &'static [&'static str];

    /// Canonical form of the body (trimmed, lowercased where relevant).
    fn normalized(self) -> Self;

    /// Normalize, then check the rules. On failure returns the violation
    /// reported to the client.
    fn normalize_and_validate(self) -> Result<Self, Option<Violation>> {
        let value = self.normalized();
        match value.validate() {
            Ok(()) => Ok(value),
            Err(errors) => Err(first_violation(&errors, Self::FIELD_ORDER)),
        }
    }
}

/// A single failed constraint: dotted field path plus constraint tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    pub field: String,
    pub tag: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is {}", self.field, self.tag)
    }
}

/// Flatten nested errors into one violation per field.
///
/// When a field fails several constraints, `required` wins; otherwise the
/// first reported constraint is kept. Output follows `order`, then path.
pub fn violations(errors: &ValidationErrors, order: &[&str]) -> Vec<Violation> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| {
        let rank = |v: &Violation| {
            order
                .iter()
                .position(|f| *f == v.field)
                .unwrap_or(usize::MAX)
        };
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });
    out
}

/// The violation reported to the client, if any.
pub fn first_violation(errors: &ValidationErrors, order: &[&str]) -> Option<Violation> {
    violations(errors, order).into_iter().next()
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let picked = errs
                    .iter()
                    .find(|e| e.code == "required")
                    .or_else(|| errs.first());
                if let Some(e) = picked {
                    out.push(Violation {
                        field: path,
                        tag: e.code.to_string(),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;
    use crate::models::student::{ParentRequest, SchoolStudentRequest};

    fn request() -> SchoolStudentRequest {
        SchoolStudentRequest {
            first_name: "Tom".into(),
            last_name: "Sawyer".into(),
            gender: "male".into(),
            grade: "6".into(),
            address: "1 River Rd".into(),
            parent: ParentRequest {
                first_name: "Polly".into(),
                last_name: "Sawyer".into(),
                email: "polly@example.com".into(),
                phone: "5551234567".into(),
                address: "1 River Rd".into(),
            },
        }
    }

    #[test]
    fn top_level_required_field() {
        let mut req = request();
        req.first_name = "   ".into();
        let errs = req.validate().unwrap_err();
        let v = first_violation(&errs, SchoolStudentRequest::FIELD_ORDER).unwrap();
        assert_eq!(v.to_string(), "first_name is required");
    }

    #[test]
    fn nested_fields_are_dotted() {
        let mut req = request();
        req.parent.email = "not-an-email".into();
        let errs = req.validate().unwrap_err();
        assert_eq!(first_violation(&errs, SchoolStudentRequest::FIELD_ORDER).unwrap().to_string(), "parent.email is email");
    }

    #[test]
    fn required_wins_over_format() {
        let mut req = request();
        req.parent.email = String::new();
        let errs = req.validate().unwrap_err();
        assert_eq!(
            first_violation(&errs, SchoolStudentRequest::FIELD_ORDER).unwrap().to_string(),
            "parent.email is required"
        );
    }

    #[test]
    fn phone_length_is_reported() {
        let mut req = request();
        req.parent.phone = "123".into();
        let errs = req.validate().unwrap_err();
        assert_eq!(first_violation(&errs, SchoolStudentRequest::FIELD_ORDER).unwrap().to_string(), "parent.phone is length");
    }

    #[test]
    fn ordering_is_deterministic() {
        let errs = SchoolStudentRequest::default().validate().unwrap_err();
        let all = violations(&errs, SchoolStudentRequest::FIELD_ORDER);
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].to_string(), "first_name is required");
        assert_eq!(all[5].field, "parent.first_name");
        assert_eq!(all.last().unwrap().field, "parent.address");
    }

    #[test]
    fn declared_order_beats_alphabetical() {
        let mut req = request();
        req.address = String::new();
        req.last_name = String::new();
        req.parent.phone = "1".into();
        let errs = req.validate().unwrap_err();
        let all: Vec<String> = violations(&errs, SchoolStudentRequest::FIELD_ORDER)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(
            all,
            ["last_name is required", "address is required", "parent.phone is length"]
        );
    }

    #[test]
    fn unlisted_fields_sort_last() {
        let mut req = request();
        req.first_name = String::new();
        req.parent.email = "nope".into();
        let errs = req.validate().unwrap_err();
        let all = violations(&errs, &["parent.email"]);
        assert_eq!(all[0].field, "parent.email");
        assert_eq!(all[1].field, "first_name");
    }

    #[test]
    fn padded_phone_is_measured_after_trimming() {
        let mut req = request();
        req.parent.phone = "      1234567".into();
        let v = req.normalize_and_validate().unwrap_err().unwrap();
        assert_eq!(v.to_string(), "parent.phone is length");
    }

    #[test]
    fn padded_email_is_accepted_and_trimmed() {
        let mut req = request();
        req.parent.email = "  Polly@Example.com ".into();
        let req = req.normalize_and_validate().unwrap();
        assert_eq!(req.parent.email, "polly@example.com");
    }
}
