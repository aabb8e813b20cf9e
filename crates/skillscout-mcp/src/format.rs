//! Plain-text rendering of tool responses.

use std::borrow::Cow;
use std::fmt::Write;

use skillscout_skills::{RetrievalIndex, ScoredSkill};

pub const NO_RESULTS: &str = "No relevant skills found for the given task description.";

const RULE: &str = "--------------------------------------------------------------------------------";

/// Cut `content` to at most `max_chars` characters and append a pointer to the
/// full skill.
#[must_use]
pub fn truncate_content<'a>(
    content: &'a str,
    max_chars: Option<usize>,
    source: &str,
) -> Cow<'a, str> {
    let Some(max) = max_chars else {
        return Cow::Borrowed(content);
    };
    match content.char_indices().nth(max) {
        Some((cut, _)) => Cow::Owned(format!(
            "{}\n\n[... content truncated, see full skill at {source}]",
            &content[..cut]
        )),
        None => Cow::Borrowed(content),
    }
}

#[must_use]
pub fn format_search_results(
    task: &str,
    results: &[ScoredSkill],
    max_chars: Option<usize>,
) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_owned();
    }

    let mut out = format!("Found {} relevant skill(s) for: '{task}'\n", results.len());
    for (i, result) in results.iter().enumerate() {
        let skill = &result.skill;
        let _ = write!(
            out,
            "\n{RULE}\nSkill {}: {}\nRelevance Score: {:.4}\nSource: {}\nDescription: {}\n\n{}\n",
            i + 1,
            skill.name(),
            result.relevance_score,
            skill.origin(),
            skill.description(),
            truncate_content(skill.content(), max_chars, skill.origin()),
        );
    }
    out
}

#[must_use]
pub fn format_skill_list(index: &RetrievalIndex) -> String {
    if index.is_empty() {
        return "No skills are indexed.".to_owned();
    }

    let mut out = format!("{} skill(s) indexed:\n", index.len());
    for skill in index.skills() {
        let _ = write!(
            out,
            "\n- {}: {}\n  Source: {}",
            skill.name(),
            skill.description(),
            skill.origin()
        );
    }
    out.push('\n');
    out
}
