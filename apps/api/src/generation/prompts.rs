// Prompt templates for section generation and feedback revision.
// Builders are pure: identical inputs always produce identical prompts.

use crate::document::{ProjectContext, ProjectType, SectionSpec};

/// Section generation prompt template.
/// Replace: {title}, {project_type}, {abstract}, {purpose}, {technologies},
///          {objectives}, {components}, {guidance}, {pages}, {words}
pub const SECTION_PROMPT_TEMPLATE: &str = r#"Generate the {title} section for the following {project_type} project:

Abstract: {abstract}

Section Purpose: {purpose}

Additional Context:
- Technologies: {technologies}
- Objectives: {objectives}
- Components: {components}
- {guidance}

Requirements:
1. This section should be approximately {pages} pages long (about {words} words)
2. Use clear, straightforward explanations with appropriate technical depth
3. Organize content with clear sections and subsections
4. For headings, use plain text format (no special characters)
5. Write in a professional academic style with proper citations where appropriate
6. Use proper paragraph breaks for readability
7. Focus on factual information that would be relevant to this type of project
8. For CHAPTER_2, include descriptions of block diagrams (not the diagrams themselves)
9. Make this content unique, avoiding generic templates
10. Ensure all content is technically accurate and plausible"#;

/// Revision prompt template.
/// Replace: {content}, {feedback}, {purpose}, {words}
pub const REVISION_PROMPT_TEMPLATE: &str = r#"Update the following documentation section based on user feedback:

Current content:
{content}

User feedback:
{feedback}

Section Purpose: {purpose}

Requirements:
1. Maintain professional academic writing style
2. Implement the requested changes thoroughly
3. Keep the content within approximately {words} words
4. Ensure the text remains technically accurate
5. Use proper paragraph structure and organization
6. Ensure content flows logically
7. Use plain text format for headings (no special characters)"#;

/// Builds the generation prompt for one catalog section.
pub fn build_section_prompt(
    spec: &SectionSpec,
    project_type: ProjectType,
    context: &ProjectContext,
) -> String {
    let pages = spec.pages.to_string();
    let words = spec.target_words().to_string();
    fill_template(
        SECTION_PROMPT_TEMPLATE,
        &[
            ("title", spec.title),
            ("project_type", project_type.label()),
            ("abstract", context.abstract_text.as_str()),
            ("purpose", spec.description_or_empty()),
            ("technologies", context.technologies.as_str()),
            ("objectives", context.objectives.as_str()),
            ("components", context.components.as_str()),
            ("guidance", spec.guidance.unwrap_or("")),
            ("pages", pages.as_str()),
            ("words", words.as_str()),
        ],
    )
}

/// Builds the revision prompt for an existing section.
pub fn build_revision_prompt(spec: &SectionSpec, current: &str, feedback: &str) -> String {
    let words = spec.target_words().to_string();
    fill_template(
        REVISION_PROMPT_TEMPLATE,
        &[
            ("content", current),
            ("feedback", feedback),
            ("purpose", spec.description_or_empty()),
            ("words", words.as_str()),
        ],
    )
}

/// Single-pass `{name}` substitution. Substituted values are never scanned
/// again, so user text containing `{abstract}` stays literal.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = vars.iter().find(|(key, _)| {
            tail.starts_with(key) && tail[key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
