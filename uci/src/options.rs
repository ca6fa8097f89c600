//! The engine option registry.
//!
//! Options are declared once, with their type and defaults, and the registry
//! owns the current value of each. `set` does the parsing and validation and
//! nothing else: it returns the validated value and leaves it to the caller
//! to apply whatever effect the option has (resizing the hash, clearing
//! tables, ...). Keeping the two apart means a rejected value can never fire
//! a half-applied effect.

use anyhow::anyhow;
use std::fmt::Display;

#[derive(Debug, Clone)]
pub enum OptionType {
    Check { default: bool },
    Spin { default: i64, min: i64, max: i64 },
    Combo { default: &'static str, allowed: &'static [&'static str] },
    Button,
    String { default: &'static str },
}

/// A validated option value, as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Check(bool),
    Spin(i64),
    Combo(String),
    Button,
    String(String),
}

#[derive(Debug, Clone)]
pub struct UciOption {
    pub name: &'static str,
    pub option_type: OptionType,
}

impl UciOption {
    fn default_value(&self) -> OptionValue {
        match &self.option_type {
            OptionType::Check { default } => OptionValue::Check(*default),
            OptionType::Spin { default, .. } => OptionValue::Spin(*default),
            OptionType::Combo { default, .. } => OptionValue::Combo(default.to_string()),
            OptionType::Button => OptionValue::Button,
            OptionType::String { default } => OptionValue::String(default.to_string()),
        }
    }

    /// Parse and range-check a raw value against this option's type.
    fn parse(&self, value: &str) -> anyhow::Result<OptionValue> {
        match &self.option_type {
            OptionType::Check { .. } => match value {
                "true" => Ok(OptionValue::Check(true)),
                "false" => Ok(OptionValue::Check(false)),
                _ => Err(anyhow!("{} expects true or false, got {value}", self.name)),
            },

            OptionType::Spin { min, max, .. } => {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| anyhow!("{} expects a number, got {value}", self.name))?;

                if parsed < *min || *max < parsed {
                    return Err(anyhow!(
                        "{} must be between {min} and {max}, got {parsed}",
                        self.name
                    ));
                }

                Ok(OptionValue::Spin(parsed))
            }

            OptionType::Combo { allowed, .. } => {
                if allowed.iter().any(|&choice| choice == value) {
                    Ok(OptionValue::Combo(value.to_string()))
                } else {
                    Err(anyhow!("{} does not allow {value}", self.name))
                }
            }

            // A button has no value; whatever was sent along is ignored
            OptionType::Button => Ok(OptionValue::Button),

            OptionType::String { .. } => Ok(OptionValue::String(value.to_string())),
        }
    }
}

impl Display for UciOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "name {} ", self.name)?;

        match &self.option_type {
            OptionType::Check { default } => write!(f, "type check default {default}"),

            OptionType::Spin { default, min, max } => {
                write!(f, "type spin default {default} min {min} max {max}")
            }

            OptionType::Combo { default, allowed } => {
                write!(f, "type combo default {default}")?;
                for choice in *allowed {
                    write!(f, " var {choice}")?;
                }
                Ok(())
            }

            // A button is announced bare: no default, no bounds
            OptionType::Button => write!(f, "type button"),

            OptionType::String { default } => {
                let default = if default.is_empty() { "<empty>" } else { default };
                write!(f, "type string default {default}")
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Registry
//
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Default)]
pub struct OptionRegistry {
    entries: Vec<(UciOption, OptionValue)>,
}

impl OptionRegistry {
    pub fn new(options: impl IntoIterator<Item = UciOption>) -> Self {
        Self {
            entries: options
                .into_iter()
                .map(|opt| {
                    let value = opt.default_value();
                    (opt, value)
                })
                .collect(),
        }
    }

    /// Validate and store a value. Returns the parsed value so the caller
    /// can apply its effect; an `Err` leaves the stored value untouched.
    /// Names compare case-insensitively, as GUIs tend to take liberties.
    pub fn set(&mut self, name: &str, value: &str) -> anyhow::Result<OptionValue> {
        let (option, slot) = self
            .entries
            .iter_mut()
            .find(|(opt, _)| opt.name.eq_ignore_ascii_case(name))
            .ok_or(anyhow!("Unknown option: {name}"))?;

        let parsed = option.parse(value)?;

        // Buttons are pure triggers and hold no state
        if parsed != OptionValue::Button {
            *slot = parsed.clone();
        }

        Ok(parsed)
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(opt, _)| opt.name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn spin(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(OptionValue::Spin(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn check(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(OptionValue::Check(value)) => Some(*value),
            _ => None,
        }
    }
}

impl Display for OptionRegistry {
    /// Every option, one `option name ... type ...` line each, in
    /// declaration order.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (option, _) in &self.entries {
            writeln!(f, "option {option}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OptionRegistry {
        OptionRegistry::new([
            UciOption {
                name: "Hash",
                option_type: OptionType::Spin { default: 16, min: 1, max: 1024 },
            },
            UciOption {
                name: "Clear Hash",
                option_type: OptionType::Button,
            },
            UciOption {
                name: "Ponder",
                option_type: OptionType::Check { default: false },
            },
            UciOption {
                name: "Log File",
                option_type: OptionType::String { default: "" },
            },
        ])
    }

    /// Buttons must print bare. A button that inherits spin formatting (a
    /// default, or min/max bounds) confuses GUIs into rendering a widget
    /// for it, so the exact shape of each line is pinned here.
    #[test]
    fn printed_options_follow_their_type() {
        let lines: Vec<String> =
            registry().to_string().lines().map(String::from).collect();

        assert_eq!(lines[0], "option name Hash type spin default 16 min 1 max 1024");
        assert_eq!(lines[1], "option name Clear Hash type button");
        assert_eq!(lines[2], "option name Ponder type check default false");
        assert_eq!(lines[3], "option name Log File type string default <empty>");
    }

    #[test]
    fn spins_are_range_checked() {
        let mut registry = registry();

        assert!(registry.set("Hash", "64").is_ok());
        assert_eq!(registry.spin("Hash"), Some(64));

        assert!(registry.set("Hash", "0").is_err());
        assert!(registry.set("Hash", "2048").is_err());
        assert!(registry.set("Hash", "lots").is_err());

        // A rejected value leaves the previous one in place
        assert_eq!(registry.spin("Hash"), Some(64));
    }

    #[test]
    fn checks_only_accept_booleans() {
        let mut registry = registry();

        assert!(registry.set("Ponder", "true").is_ok());
        assert_eq!(registry.check("Ponder"), Some(true));
        assert!(registry.set("Ponder", "1").is_err());
    }

    #[test]
    fn buttons_fire_without_storing_anything() {
        let mut registry = registry();

        assert_eq!(registry.set("Clear Hash", "").unwrap(), OptionValue::Button);
        assert_eq!(registry.get("Clear Hash"), Some(&OptionValue::Button));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = registry();

        assert!(registry.set("hash", "32").is_ok());
        assert_eq!(registry.spin("Hash"), Some(32));
    }

    #[test]
    fn unknown_options_are_rejected() {
        assert!(registry().set("Contempt", "10").is_err());
    }
}
