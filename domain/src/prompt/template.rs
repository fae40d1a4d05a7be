//! Prompt templates for participants, the moderator, and the side passes

/// Templates for generating prompts at each stage of a conversation
pub struct PromptTemplate;

impl PromptTemplate {
    /// Shared instructions given to every participant on every turn
    pub fn collaboration_guidelines(participant_count: usize, max_turns: usize) -> String {
        format!(
            r#"You are collaborating with {count} participant(s) to produce ONE cohesive, CONCISE consensus document.
You have a maximum of {max_turns} rounds (total of {total} individual turns across all participants) to complete the work.

DELIVERABLE: A short markdown document that captures the agreed-upon stance.
Template:
# <Concise Title>
## Position
<1 short paragraph stating the agreed stance in plain language>
## Key Reasons
- <bullet 1>
- <bullet 2>
- <bullet 3>
## Trade-offs
- <bullet 1>
- <bullet 2>
## Final Recommendation
<1 short paragraph with the action-oriented recommendation>

GUIDELINES:
- Be concise. Every sentence must serve a clear purpose.
- This is a professional consensus statement, not an essay.
- Keep paragraphs to 2-4 sentences. Use bullet points for lists.
- Read what others have written and do not repeat points already made.
- Edit, don't just add: use ReplaceSection to refine and consolidate content.
- Use only the template headings unless absolutely necessary.
- If disagreement exists, capture the trade-off succinctly, then converge on a stance.

Completion:
- An editor may periodically review the document for conciseness and coherence.
- As you approach the final rounds, prioritize convergence and finalize the recommendation.
- Do not call SaveToFile; the document is saved when the conversation finishes."#,
            count = participant_count,
            max_turns = max_turns,
            total = participant_count * max_turns,
        )
    }

    /// Instructions for the embedded-JSON tool protocol
    pub fn fallback_tool_protocol() -> &'static str {
        r#"To edit the shared document, emit one or more fenced blocks labeled `tool`.
Each block holds a single command object or a JSON array of command objects:

```tool
[
  {"tool": "markdown.SetTitle", "args": {"title": "Concise Title"}},
  {"tool": "markdown.ReplaceSection", "args": {"headingText": "Position", "content": "One short paragraph."}}
]
```

Available commands (namespace `markdown`):
- SetTitle {title}
- AddHeading {text, level (1-6, default 2)}
- AppendParagraph {text}
- InsertAfterHeading {headingText, content}
- ReplaceSection {headingText, content}
- ListHeadings {}

Commands run in order. Invalid commands are ignored."#
    }

    /// User prompt for one participant turn
    pub fn participant_turn(
        guidelines: &str,
        tool_protocol: Option<&str>,
        document_outline: &str,
        recent_history: &[String],
        current_message: &str,
        rounds_remaining: Option<usize>,
    ) -> String {
        let mut prompt = String::from(guidelines);
        prompt.push_str("\n\n");

        if let Some(protocol) = tool_protocol {
            prompt.push_str(protocol);
            prompt.push_str("\n\n");
        }

        if let Some(remaining) = rounds_remaining {
            prompt.push_str(&format!(
                "IMPORTANT: Only {} turn(s) remaining. Focus on wrapping up and reaching a clear conclusion.\n\n",
                remaining
            ));
        }

        prompt.push_str("Current document state:\n");
        if document_outline.trim().is_empty() {
            prompt.push_str("Document is empty");
        } else {
            prompt.push_str(document_outline);
        }
        prompt.push_str("\n\n");

        if !recent_history.is_empty() {
            prompt.push_str("Recent conversation:\n");
            prompt.push_str(&recent_history.join("\n"));
            prompt.push_str("\n\n");
        }

        prompt.push_str(&format!("Current message: {}", current_message));
        prompt
    }

    /// Default moderator instructions, used when none are configured
    pub fn moderator_base_system() -> &'static str {
        r#"You are a conversation moderator managing a collaborative discussion between multiple participants.

Your role:
- Analyze the current conversation state and document progress
- Select which participant should speak next based on their expertise and the conversation needs
- Ensure balanced participation while prioritizing the most relevant voice at each stage
- Guide the conversation toward a complete, well-structured document
- Recognize when the conversation goal has been achieved

When selecting a participant, consider:
- Their unique expertise and perspective
- What the document currently needs (structure, content, refinement, conclusion)
- Who hasn't contributed recently (for balanced participation)
- The current stage of the discussion (brainstorming, organizing, detailing, concluding)"#
    }

    /// Full moderator system prompt: base, roster, response format
    pub fn moderator_system(base: Option<&str>, roster: &[(String, String)]) -> String {
        let mut prompt = String::from(base.unwrap_or(Self::moderator_base_system()));
        prompt.push_str("\n\nAvailable participants:\n");
        for (name, description) in roster {
            prompt.push_str(&format!("- {}: {}\n", name, description));
        }

        prompt.push_str(
            r#"
You must decide:
1. Whether the conversation should continue or conclude
2. If continuing, which participant should speak next

Response format:
Line 1: Either a participant name OR 'CONCLUDE'
Line 2 (optional): Reason: <brief reason for your decision>

Decision criteria for CONCLUDE:
- Document has substantive content aligned with the consensus template
- Key viewpoints have been heard (check participation balance)
- A clear position/recommendation has emerged
- Remaining turns are insufficient for meaningful additions
- DO NOT conclude prematurely just because participants agree on one point
"#,
        );

        if let Some((first, _)) = roster.first() {
            prompt.push_str(&format!(
                "\nExample (continue):\n{}\nReason: Need to address trade-offs section\n",
                first
            ));
        }
        prompt.push_str(
            "\nExample (conclude):\nCONCLUDE\nReason: Document complete, all participants contributed, clear consensus reached",
        );
        prompt
    }

    /// User prompt for one speaker selection
    pub fn moderator_context(
        current_message: &str,
        recent_history: &[String],
        document_outline: &str,
        participation: &[(String, usize)],
        roster: &[&str],
        turns_remaining: usize,
    ) -> String {
        let mut context = format!("Current topic/message: {}\n\n", current_message);

        if !recent_history.is_empty() {
            context.push_str("Recent conversation:\n");
            context.push_str(&recent_history.join("\n"));
            context.push_str("\n\n");
        }

        context.push_str("Current document state:\n");
        if document_outline.trim().is_empty() {
            context.push_str("[Document is empty]\n");
        } else {
            context.push_str(document_outline);
            context.push('\n');
        }
        context.push('\n');

        context.push_str("Speaker participation count:\n");
        for (name, count) in participation {
            context.push_str(&format!("- {}: {} time(s)\n", name, count));
        }
        context.push('\n');

        context.push_str("Available participants:\n");
        for name in roster {
            context.push_str(&format!("- {}\n", name));
        }
        context.push('\n');

        if turns_remaining <= 3 {
            context.push_str(&format!(
                "URGENT: Only {} turn(s) remaining. Select someone who can help wrap up and conclude.\n\n",
                turns_remaining
            ));
        }

        context.push_str("Who should speak next?");
        context
    }

    /// Prompt asking for a single-paragraph history summary
    pub fn summarize(history_text: &str) -> String {
        format!(
            "Summarize the following conversation history into a single concise paragraph. \
Capture key points, decisions, and arguments. Do not lose critical context.\n\nHistory:\n{}",
            history_text
        )
    }

    /// System prompt for history summarization outside directed mode
    pub fn summarizer_system() -> &'static str {
        "You condense discussion transcripts. Reply with one plain paragraph and nothing else."
    }

    /// Default editor instructions, used when none are configured
    pub fn editor_base_system() -> &'static str {
        r#"You are a professional editor responsible for maintaining document quality and coherence.

Your role:
- Review the collaborative document after contributors add content
- Consolidate redundant or repetitive sections
- Remove verbose or rambling text
- Maintain clear structure with appropriate headings
- Preserve the core message while improving clarity
- Keep the document focused on the main goal

Guidelines for editing:
- Merge similar points under single headings
- Convert narrative prose into clear, direct statements
- Keep paragraphs short (2-4 sentences max)
- Prefer bullet points or structured lists over long paragraphs when appropriate"#
    }

    /// Editor system prompt: base plus the editing priorities
    pub fn editor_system(base: Option<&str>) -> String {
        format!(
            r#"{}

Editing priorities:
1. Remove verbose, rambling text
2. Consolidate redundant sections
3. Shorten paragraphs (max 2-4 sentences)
4. Eliminate duplicate or similar headings
5. Align sections to the consensus template (Position, Key Reasons, Trade-offs, Final Recommendation)
6. Prefer ReplaceSection to refine and streamline content"#,
            base.unwrap_or(Self::editor_base_system())
        )
    }

    /// User prompt for one editor review
    pub fn editor_review(document: &str, recent_context: &str) -> String {
        format!(
            r#"Current document:
```markdown
{}
```

Recent conversation context:
{}

Review this document and edit it for clarity, conciseness, and structure. Remove redundancy, consolidate similar points, and ensure it directly serves the main goal.

Restructure to the consensus template when possible:
- Title (H1)
- Position (concise paragraph)
- Key Reasons (bullets)
- Trade-offs (bullets)
- Final Recommendation (concise paragraph)

Prefer replacing existing sections over appending new content. Use InsertAfterHeading only when adding essential, brief content."#,
            document, recent_context
        )
    }

    /// System prompt for the fact checker
    pub fn fact_check_system() -> &'static str {
        r#"You are a rigorous fact-checking agent.
Your role:
- Monitor the conversation for factual claims, statistics, and assertions.
- Verify them against your knowledge.
- If a claim is dubious, fabricated, or definitely false, flag it.
- If a claim is generally true or subjective, do nothing.

Output format:
- If no issues: return 'PASS'
- If issues found: return 'FLAG: <description of the error and correction>'"#
    }

    /// User prompt for one fact check
    pub fn fact_check(message: &str) -> String {
        format!(
            "Verify the following text for factual accuracy:\n\n{}",
            message
        )
    }

    /// System prompt for the structured-data extractor
    pub fn extraction_system(schema_description: &str) -> String {
        format!(
            r#"You are a data extraction specialist.
Your goal is to extract structured data from the conversation and document state based on the following schema description:
'{}'

Output requirements:
- Return ONLY valid JSON.
- Do not add markdown formatting (like ```json).
- Do not add conversational text.
- If data is missing, use null or empty strings."#,
            schema_description
        )
    }

    /// User prompt for structured-data extraction
    pub fn extraction(document: &str, history_text: &str, schema_description: &str) -> String {
        format!(
            r#"Document content:
{}

Recent conversation:
{}

Based on the schema description '{}', extract the data into a JSON object."#,
            document, history_text, schema_description
        )
    }

    /// System prompt for the tooling check
    pub fn verification_system() -> String {
        format!(
            r#"{}

Output the fallback tool JSON that would perform, in order:
SetTitle('Verification Title'), AddHeading('Verification Section', 2), AppendParagraph('This is a verification paragraph.').
No extra commentary."#,
            Self::fallback_tool_protocol()
        )
    }

    /// User prompt for the tooling check
    pub fn verification() -> &'static str {
        "Please prepare a verification document and use the available tools to set a title and add a section."
    }
}
