use regex::Regex;

use crate::ast::Group;
use crate::error::NestError;
use crate::parse_nest;

/// A compiled nest group: which tree positions it covers and how many
/// children a node at such a position may have.
#[derive(Debug, Clone)]
pub struct NestRule {
    pub position: Regex,
    pub max_children: u32,
}

impl NestRule {
    pub fn compile(group: &Group) -> Result<NestRule, NestError> {
        let position = Regex::new(&group.to_regex_source())
            .map_err(|e| NestError::Regex(e.to_string()))?;

        Ok(NestRule {
            position,
            max_children: group.max_children,
        })
    }

    pub fn applies_to(&self, position: &str) -> bool {
        self.position.is_match(position)
    }
}

/// Parse and compile a nest rule string (shorthands included).
///
/// Rule order is preserved; the first rule whose position pattern
/// matches decides the limit.
pub fn compile_nest(input: &str) -> Result<Vec<NestRule>, NestError> {
    let spec = parse_nest(input)?;
    spec.groups.iter().map(NestRule::compile).collect()
}

/// Select the limit for a tree-position string, if any rule covers it.
pub fn limit_for(rules: &[NestRule], position: &str) -> Option<u32> {
    rules
        .iter()
        .find(|r| r.applies_to(position))
        .map(|r| r.max_children)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_first_level_rules() {
        let rules = compile_nest("{R,5}{R.*,3}").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].max_children, 5);
        assert_eq!(rules[1].max_children, 3);

        assert!(rules[0].applies_to("0"));
        assert!(!rules[0].applies_to("0.1"));
        assert!(rules[1].applies_to("0.0"));
        assert!(rules[1].applies_to("0.17"));
        assert!(!rules[1].applies_to("0"));
        assert!(!rules[1].applies_to("0.1.2"));
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = compile_nest("{R.1,7}{R.*,2}").unwrap();
        assert_eq!(limit_for(&rules, "0.1"), Some(7));
        assert_eq!(limit_for(&rules, "0.4"), Some(2));
        assert_eq!(limit_for(&rules, "0"), None);
    }

    #[test]
    fn literal_index_does_not_match_prefix() {
        let rules = compile_nest("{R.1,4}").unwrap();
        assert!(rules[0].applies_to("0.1"));
        assert!(!rules[0].applies_to("0.10"));
    }
}
