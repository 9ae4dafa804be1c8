//! Prompt templates and rendering.
//!
//! Rendering is a pure function: the same template and fields always produce
//! the same string, and a placeholder without a value is a `TemplateError`
//! rather than silent empty output. Placeholders are `{name}`; literal braces
//! are written `{{` and `}}`.

use crate::errors::TemplateError;

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    text: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }

    /// Substitute `{field}` placeholders from `fields`. No side effects.
    pub fn render(&self, fields: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        out.push('{');
                        continue;
                    }
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(k) => key.push(k),
                            None => {
                                return Err(TemplateError::UnterminatedPlaceholder {
                                    template: self.name.to_string(),
                                })
                            }
                        }
                    }
                    let value = fields
                        .iter()
                        .find(|(name, _)| *name == key)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::MissingField {
                            template: self.name.to_string(),
                            field: key.clone(),
                        })?;
                    out.push_str(value);
                }
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                    }
                    out.push('}');
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

/// Few-shot classification prompt. Decides whether a reply is a clarifying
/// question or a direct code attempt; the model must answer with a single
/// JSON object.
pub const CLASSIFIER: Template = Template::new(
    "classifier",
    r#"You are an expert analyst classifying responses from a code-generation
language model. Decide whether the response below is a "Clarifying Question"
or a "Code Solution".

- A "Clarifying Question" asks for more information, points out ambiguities,
  or seeks to pin down the requirements without providing a functional code
  block.
- A "Code Solution" contains a code block (```) intended to solve the problem,
  even when accompanied by explanatory text.

Respond with ONLY a JSON object of the form
{{"classification": "CATEGORY"}}, where CATEGORY is either
"Clarifying Question" or "Code Solution".

---
### EXAMPLE 1 ###
[INPUT RESPONSE]:
To implement `candidate` I would need to understand the problem better. The
description does not specify what `k` is. Could you provide more information
about the constraint on `k`?

[CLASSIFICATION]:
{{"classification": "Clarifying Question"}}

---
### EXAMPLE 2 ###
[INPUT RESPONSE]:
Here is a possible implementation:
```python
def candidate(xs):
    return sorted(xs)
```
This sorts the input in ascending order and returns the result.

[CLASSIFICATION]:
{{"classification": "Code Solution"}}

---
### YOUR TASK ###
Please classify the following response:

[INPUT RESPONSE]:
{reply}

[CLASSIFICATION]:
"#,
);

/// Rubric-and-analysis scoring prompt for one juror. The juror grades the
/// clarifying question against the original and modified problem statements
/// and must answer with a single JSON object carrying the score.
pub const JUROR: Template = Template::new(
    "juror",
    r#"You are a meticulous quality evaluator. Rate the quality of a clarifying
question on an integer scale of {score_min} to {score_max}.

## EVALUATION CRITERIA ##
- Highest score: the question precisely identifies the core ambiguity,
  inconsistency or missing information and asks for exactly that.
- Middle scores: the question is relevant but too general, or addresses a
  secondary issue instead of the main one.
- Lowest score: the question is irrelevant, redundant with information already
  stated, asks about an issue that does not exist, or the model provided code
  instead of asking.

## ANALYTICAL FRAMEWORK ##
Step 1 - Identify the delta: what exactly is ambiguous, inconsistent or
missing in the modified problem compared to the original?
Step 2 - Define the ideal: what would a human expert ask to resolve it?
Step 3 - Evaluate alignment: how well does the model's question match the
ideal? Direct match scores highest; partial or indirect lower; misaligned or
code lowest.
Step 4 - Validate: would answering the model's question actually recover the
original requirements?

Remember: specificity matters. "Can you clarify?" never earns the top score.

Respond with ONLY a JSON object of the form
{{"reasoning": "your step-by-step analysis", "score": YOUR_SCORE}}.

---
### CONTEXT ###
[ORIGINAL PROBLEM]:
{problem}

[MODIFIED PROBLEM]:
{modified_problem}

[MODEL'S QUESTION]:
{question}
---
[YOUR EVALUATION]:
"#,
);
