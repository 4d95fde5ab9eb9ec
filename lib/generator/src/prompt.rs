use crate::{GeneratorError, GeneratorResult};

const REVISION_SEPARATOR: &str = " Revision: ";

const DOCUMENT_REQUIREMENTS: &str = "Reply with complete, working HTML. \
Write the whole document starting with <!DOCTYPE html> and include all HTML, CSS and JavaScript. \
Make the page responsive and follow modern design principles. \
Do not add explanations, reply only with the code.";

/// Joins an instruction history into a single prompt. The first instruction describes the site
/// and every later one is appended as a revision.
pub fn combine_instructions(instructions: &[String]) -> GeneratorResult<String> {
    let (first, revisions) = instructions
        .split_first()
        .ok_or(GeneratorError::NoInstructions)?;

    let mut prompt = first.clone();
    for revision in revisions {
        prompt.push_str(REVISION_SEPARATOR);
        prompt.push_str(revision);
    }

    Ok(prompt)
}

/// Appends the requirements for a complete, self-contained document.
pub fn with_document_requirements(prompt: &str) -> String {
    format!("{prompt}\n\n{DOCUMENT_REQUIREMENTS}")
}
