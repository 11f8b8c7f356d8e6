pub const SYSTEM_PROMPT: &str =
    "You are a Health IT technology and regulatory expert, well versed in ONC";

const RESPONSE_SHAPE: &str = r#"interface Response {
    summary: string; // Markdown with your overall summary content
    changesFromProposal?: string; // Markdown with bullet list showing any important categories of changes from the proposal (omit if this does not apply)
    keyPointsByAudience?: {
        audience: "ehr-developer" | "regulator" | "healthcare-provider" | "patient"; // The audience for this key point
        point: string // markdown formatted key points, in 2nd person
    }[]
}"#;

/// User message asking for a plain-language summary of `text`
#[must_use]
pub fn user_prompt(position: &str, text: &str) -> String {
    format!(
        "Summarize the following regulatory text, reducing it to plain language without adding \
any commentary, and using a clear tone similar to Paul Graham. Use active voice, jargon-free, \
and do not preface comments with contextualization or other preamble. Condense considerably.

Position in Regulation: {position}

```
{text}
```

Your output uses JSON in the following format:

{RESPONSE_SHAPE}
"
    )
}
