// Prompt constants for cover-letter generation.

/// System prompt: plain prose only, no markup around the letter.
pub const COVER_LETTER_SYSTEM: &str =
    "You are an experienced career coach who writes concise, specific cover letters. \
    Respond with the letter body only: plain paragraphs separated by blank lines. \
    Do NOT include a subject line, placeholders, markdown, or commentary.";

/// Generation prompt. Replace `{title}`, `{company}`, `{description}` and `{topics}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a cover letter for the following role.

Role: {title}
Company: {company}

Job description:
{description}

Topics to cover, with emphasis weights from 0.0 (mention briefly) to 1.0 (make central):
{topics}

Give more space to higher-weighted topics. Keep it under 400 words. Do not invent
employers, dates, or credentials that are not implied by the topics."#;
