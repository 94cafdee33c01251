// Load option parsing for the driver image
//
// Features:
// - UCS-2 load option buffers, terminated by NUL or buffer end
// - Whitespace-separated arguments
// - Key-value pairs (key=value, key="quoted value")
// - Flag detection (--flag)
// - Unknown arguments are kept, never rejected

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{EntryError, Result};

/// Keep the boot list when resetting through the NVRAM reset facility
pub const PRESERVE_BOOT_FLAG: &str = "--preserve-boot";
/// Use the firmware's own NVRAM reset
pub const NATIVE_FLAG: &str = "--native";

/// One parsed argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVar {
    pub name: String,
    pub value: Option<String>,
}

/// Arguments from the image's load options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    vars: Vec<ParsedVar>,
}

impl LoadOptions {
    /// Parse a raw load option buffer.
    ///
    /// Absent, empty and blank buffers report [`EntryError::NoLoadOptions`];
    /// anything that is not valid UCS-2 or breaks the argument grammar is
    /// [`EntryError::MalformedLoadOptions`].
    pub fn parse(raw: Option<&[u8]>) -> Result<Self> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(EntryError::NoLoadOptions),
        };

        if raw.len() % 2 != 0 {
            return Err(EntryError::MalformedLoadOptions("Load options are not UCS-2"));
        }

        let units = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|&unit| unit != 0);

        let text = char::decode_utf16(units)
            .collect::<core::result::Result<String, _>>()
            .map_err(|_| EntryError::MalformedLoadOptions("Load options are not UCS-2"))?;

        Self::parse_str(&text)
    }

    /// Parse already decoded load options
    pub fn parse_str(text: &str) -> Result<Self> {
        let mut vars = Vec::new();
        let mut chars = text.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.peek().is_none() {
                break;
            }

            let mut name = String::new();
            while let Some(c) = chars.next_if(|&c| !c.is_whitespace() && c != '=') {
                name.push(c);
            }
            if name.is_empty() {
                return Err(EntryError::MalformedLoadOptions("Load option without a name"));
            }

            let value = if chars.next_if_eq(&'=').is_some() {
                let mut value = String::new();
                if chars.next_if_eq(&'"').is_some() {
                    loop {
                        match chars.next() {
                            Some('"') => break,
                            Some(c) => value.push(c),
                            None => {
                                return Err(EntryError::MalformedLoadOptions(
                                    "Unterminated quoted load option",
                                ));
                            }
                        }
                    }
                } else {
                    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                        value.push(c);
                    }
                }
                Some(value)
            } else {
                None
            };

            vars.push(ParsedVar { name, value });
        }

        if vars.is_empty() {
            return Err(EntryError::NoLoadOptions);
        }

        Ok(Self { vars })
    }

    /// Check if an argument is present, with or without a value
    pub fn has_var(&self, name: &str) -> bool {
        self.vars.iter().any(|var| var.name == name)
    }

    /// Get value for argument with key=value format
    pub fn value(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|var| var.name == name)
            .and_then(|var| var.value.as_deref())
    }

    /// All parsed arguments in command line order
    pub fn vars(&self) -> impl Iterator<Item = &ParsedVar> {
        self.vars.iter()
    }

    /// Get number of arguments
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
