//! LLM prompt construction for the three oracle calls

use crate::types::ObjectSummary;
use crate::parser::NO_RELATIONSHIP;

/// Shape hint passed with relationship calls
pub const RELATIONSHIP_SCHEMA: &str =
    r#"{"relationship_type": "string", "justification": "string"}"#;

/// Shape hint passed with evaluation calls
pub const EVALUATION_SCHEMA: &str = r#"{"score": "number 0-10", "justification": "string"}"#;

/// Build the prompt asking the oracle to label one candidate pair
pub fn relationship_prompt(
    source: &ObjectSummary,
    target: &ObjectSummary,
    permitted: &[String],
) -> String {
    let mut prompt = String::new();

    prompt.push_str(RELATIONSHIP_INSTRUCTIONS);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Source object: {}\n", object_json(source)));
    prompt.push_str(&format!("Target object: {}\n", object_json(target)));
    prompt.push_str(&format!("Valid relationship types: {}\n\n", permitted.join(", ")));

    prompt.push_str(&format!(
        "If none of the valid relationship types fits, use \"{}\".\n\n",
        NO_RELATIONSHIP
    ));
    prompt.push_str(RELATIONSHIP_FORMAT);

    prompt
}

/// Build the prompt asking for a narrative over the rendered edge lines
pub fn story_prompt(edge_lines: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Given the following STIX relationships:\n\n");
    prompt.push_str(edge_lines);
    prompt.push_str("\n\n");
    prompt.push_str(STORY_INSTRUCTIONS);
    prompt
}

/// Build the prompt asking the oracle to score edges and narrative
pub fn evaluation_prompt(edge_lines: &str, story: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(EVALUATION_INSTRUCTIONS);
    prompt.push_str("\n\nRelationships:\n");
    prompt.push_str(edge_lines);
    prompt.push_str("\n\nStory:\n");
    prompt.push_str(story);
    prompt.push_str("\n\n");
    prompt.push_str(EVALUATION_FORMAT);
    prompt
}

fn object_json(summary: &ObjectSummary) -> String {
    // Four string fields always serialize
    serde_json::to_string(summary).unwrap_or_else(|_| format!("{{\"id\": \"{}\"}}", summary.id))
}

const RELATIONSHIP_INSTRUCTIONS: &str = r#"You are an expert in STIX (Structured Threat Information Expression) relationships and cyber threat intelligence storytelling.

Task:
1. Analyze the source and target objects, considering their types and attributes.
2. Choose the most appropriate relationship type from the valid relationships list that fits the narrative.
3. Provide a brief justification for your choice (1-2 sentences)."#;

const RELATIONSHIP_FORMAT: &str = r#"Provide your answer in the following JSON format:
{
    "relationship_type": "chosen_relationship_or_NO_RELATIONSHIP",
    "justification": "Your brief justification here"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const STORY_INSTRUCTIONS: &str = r#"Provide a brief analysis of the cyber threat story these relationships tell.
Focus on key actors, their motivations, and the progression of their activities.
Limit your response to 3-5 paragraphs."#;

const EVALUATION_INSTRUCTIONS: &str = r#"You are an expert in evaluating STIX relationships and cyber threat intelligence narratives.

Task:
1. Evaluate the coherence and plausibility of the relationships.
2. Assess how well the story captures the essence of the relationships.
3. Consider the diversity of relationship types and object types involved.
4. Provide a score from 0 to 10, where 0 is completely implausible or incoherent, and 10 is highly coherent and compelling.
5. Provide a brief justification for your score (2-3 sentences)."#;

const EVALUATION_FORMAT: &str = r#"Provide your answer in the following JSON format:
{
    "score": your_score_here,
    "justification": "Your justification here"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

#[cfg(test)]
mod tests {
    use super::*;
    use stixstory_domain::StixObject;

    #[test]
    fn test_relationship_prompt_contents() {
        let source = ObjectSummary::from(
            &StixObject::new("threat-actor--1", "threat-actor").with_name("Silent Griffin"),
        );
        let target = ObjectSummary::from(&StixObject::new("identity--2", "identity"));
        let permitted = vec!["attributed-to".to_string(), "impersonates".to_string()];

        let prompt = relationship_prompt(&source, &target, &permitted);
        assert!(prompt.contains("threat-actor--1"));
        assert!(prompt.contains("Silent Griffin"));
        assert!(prompt.contains("identity--2"));
        assert!(prompt.contains("No description available"));
        assert!(prompt.contains("Valid relationship types: attributed-to, impersonates"));
        assert!(prompt.contains("NO_RELATIONSHIP"));
    }

    #[test]
    fn test_source_precedes_target() {
        let source = ObjectSummary::from(&StixObject::new("src-id", "tool"));
        let target = ObjectSummary::from(&StixObject::new("tgt-id", "malware"));
        let prompt = relationship_prompt(&source, &target, &["drops".to_string()]);

        let src_pos = prompt.find("Source object: {\"id\":\"src-id\"").unwrap();
        let tgt_pos = prompt.find("Target object: {\"id\":\"tgt-id\"").unwrap();
        assert!(src_pos < tgt_pos);
    }

    #[test]
    fn test_story_prompt_includes_lines() {
        let prompt = story_prompt("a uses b: x\nc targets d: y");
        assert!(prompt.contains("a uses b: x"));
        assert!(prompt.contains("3-5 paragraphs"));
    }

    #[test]
    fn test_evaluation_prompt_includes_story() {
        let prompt = evaluation_prompt("a uses b: x", "Once upon a time");
        assert!(prompt.contains("a uses b: x"));
        assert!(prompt.contains("Once upon a time"));
        assert!(prompt.contains("score"));
    }
}
