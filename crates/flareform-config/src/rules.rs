//! Cross-field invariants
//!
//! Invariants are data, not code paths: each [`Rule`] names the attributes it
//! covers and an [`Arity`], and the diagnostic text is rendered from both.

use crate::error::{ConfigError, Result};
use crate::fields::{API_KEY, API_TOKEN, API_USER_SERVICE_KEY, EMAIL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one of the fields must have a value.
    ExactlyOne,
    /// When `fields[0]` has a value, every other field must too.
    CoRequires,
    /// At least one of the fields must have a value.
    AtLeastOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub fields: &'static [&'static str],
    pub arity: Arity,
}

/// Rules checked by the resolver, in order.
pub const RULES: &[Rule] = &[
    Rule {
        fields: &[API_KEY, API_TOKEN, API_USER_SERVICE_KEY],
        arity: Arity::ExactlyOne,
    },
    Rule {
        fields: &[API_KEY, EMAIL],
        arity: Arity::CoRequires,
    },
];

/// `"a"`, `"a" or "b"`, `"a", "b" or "c"`
fn join_quoted(fields: &[&str]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| format!("{:?}", f)).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

impl Rule {
    /// Check the rule given a predicate telling whether a field has a value.
    pub fn check(&self, present: &dyn Fn(&str) -> bool) -> Result<()> {
        let set: Vec<&'static str> = self.fields.iter().copied().filter(|f| present(f)).collect();

        match self.arity {
            Arity::ExactlyOne if set.len() == 1 => Ok(()),
            Arity::ExactlyOne => {
                let detail = if set.is_empty() {
                    format!("none of {} was configured", join_quoted(self.fields))
                } else {
                    format!(
                        "{} were all configured; only one credential may be active",
                        join_quoted(&set).replace(" or ", " and ")
                    )
                };
                Err(self.violation(
                    format!("must provide exactly one of {}.", join_quoted(self.fields)),
                    detail,
                ))
            }
            Arity::AtLeastOne if !set.is_empty() => Ok(()),
            Arity::AtLeastOne => Err(self.violation(
                format!("must provide at least one of {}.", join_quoted(self.fields)),
                format!("none of {} was configured", join_quoted(self.fields)),
            )),
            Arity::CoRequires => {
                let Some((trigger, required)) = self.fields.split_first() else {
                    return Ok(());
                };
                if !present(trigger) {
                    return Ok(());
                }
                let missing: Vec<&str> = required.iter().copied().filter(|f| !present(f)).collect();
                if missing.is_empty() {
                    return Ok(());
                }
                Err(self.violation(
                    format!("{} is not set correctly", join_quoted(&missing).replace(" or ", " and ")),
                    format!(
                        "{} is required with {:?} and was not configured",
                        join_quoted(&missing).replace(" or ", " and "),
                        trigger
                    ),
                ))
            }
        }
    }

    fn violation(&self, summary: String, detail: String) -> ConfigError {
        ConfigError::Rule {
            fields: self.fields.to_vec(),
            summary,
            detail,
        }
    }
}

/// Check every rule in order, stopping at the first violation.
pub fn check_all(present: &dyn Fn(&str) -> bool) -> Result<()> {
    RULES.iter().try_for_each(|rule| rule.check(present))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(set: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |f| set.iter().any(|s| *s == f)
    }

    #[test]
    fn test_join_quoted() {
        assert_eq!(join_quoted(&["a"]), "\"a\"");
        assert_eq!(join_quoted(&["a", "b"]), "\"a\" or \"b\"");
        assert_eq!(join_quoted(&["a", "b", "c"]), "\"a\", \"b\" or \"c\"");
    }

    #[test]
    fn test_exactly_one_accepts_single() {
        assert!(RULES[0].check(&only(&["api_token"])).is_ok());
    }

    #[test]
    fn test_exactly_one_rejects_none_and_many() {
        let none = RULES[0].check(&only(&[])).unwrap_err();
        let many = RULES[0].check(&only(&["api_key", "api_token"])).unwrap_err();

        let expected =
            "must provide exactly one of \"api_key\", \"api_token\" or \"api_user_service_key\".";
        assert_eq!(none.to_string(), expected);
        assert_eq!(many.to_string(), expected);
        assert_eq!(
            many.fields(),
            vec!["api_key", "api_token", "api_user_service_key"]
        );
        assert!(many.to_diagnostic().detail.contains("\"api_key\" and \"api_token\""));
    }

    #[test]
    fn test_co_requires() {
        assert!(RULES[1].check(&only(&["api_token"])).is_ok());
        assert!(RULES[1].check(&only(&["api_key", "email"])).is_ok());

        let err = RULES[1].check(&only(&["api_key"])).unwrap_err();
        assert_eq!(err.to_string(), "\"email\" is not set correctly");
        assert_eq!(
            err.to_diagnostic().detail,
            "\"email\" is required with \"api_key\" and was not configured"
        );
    }

    #[test]
    fn test_at_least_one() {
        let rule = Rule {
            fields: &["zone_id", "account_id"],
            arity: Arity::AtLeastOne,
        };
        assert!(rule.check(&only(&["account_id"])).is_ok());
        assert!(rule.check(&only(&["zone_id", "account_id"])).is_ok());
        let err = rule.check(&only(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "must provide at least one of \"zone_id\" or \"account_id\"."
        );
    }

    #[test]
    fn test_check_all_stops_at_first() {
        // 資格情報なし → ExactlyOne が先に失敗する
        let err = check_all(&only(&[])).unwrap_err();
        assert!(err.to_string().starts_with("must provide exactly one of"));
    }
}
