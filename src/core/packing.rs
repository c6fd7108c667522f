//! # Packing Domain
//!
//! The records passed between the controller and the renderers, plus the
//! two pure text transforms around the generation call: building the prompt
//! that goes out and turning the reply that comes back into a `PackingList`.
//!
//! ```text
//! trip text ──build_prompt()──▶ provider ──raw text──▶ strip_code_fence()
//!                                                          │
//!                                  PackingList ◀──serde────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Never edited after it is appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A named group of items, e.g. "Clothing" → ["Shirt", "Pants"].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub items: Vec<String>,
}

/// The structured result of one generation. Replaced wholesale, never merged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PackingList {
    pub categories: Vec<Category>,
}

impl PackingList {
    /// Total number of checklist rows across all categories.
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// Plain-text checklist, used by the headless `--trip` mode.
impl fmt::Display for PackingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, category) in self.categories.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", category.name)?;
            for item in &category.items {
                writeln!(f, "  [ ] {item}")?;
            }
        }
        Ok(())
    }
}

const FENCE: &str = "```";

/// Removes a surrounding markdown code fence, if any, and trims whitespace.
///
/// Handles both the multi-line form (```` ```json\n{...}\n``` ````) and the
/// single-line form (```` ```{...}``` ````). Text without a fence comes back
/// trimmed, so the function is idempotent.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) that may follow the opening fence
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    body.trim_end().strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Parses the model's reply into a `PackingList`, tolerating a code fence.
pub fn parse_packing_list(raw: &str) -> Result<PackingList, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

/// Builds the prompt sent to the model for a trip description.
pub fn build_prompt(trip: &str) -> String {
    format!(
        "Create a packing list for the following trip:\n\
         {trip}\n\n\
         Respond with ONLY a JSON object in exactly this format, with no \
         explanation before or after it and no markdown code fences:\n\
         {{\"categories\": [{{\"name\": \"Category Name\", \"items\": [\"Item 1\", \"Item 2\"]}}]}}\n\n\
         Group related items into sensible categories (for example Clothing, \
         Toiletries, Documents, Electronics) and tailor the list to the \
         destination, duration, season and activities described."
    )
}
