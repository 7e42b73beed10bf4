//! Request validation
//!
//! Malformed submissions are rejected here, before a job record is ever
//! created.

use crate::handlers::types::CreateJobRequest;

const TOPIC_MIN: usize = 3;
const TOPIC_MAX: usize = 1000;
const BUDGET_MIN: usize = 1;
const BUDGET_MAX: usize = 5;

/// Validate a job creation request, collecting every problem found.
pub fn validate_create_request(request: &CreateJobRequest) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let topic_len = request.topic.trim().chars().count();
    if topic_len < TOPIC_MIN {
        errors.push(format!(
            "topic: must be at least {} characters long",
            TOPIC_MIN
        ));
    }
    if topic_len > TOPIC_MAX {
        errors.push(format!("topic: cannot exceed {} characters", TOPIC_MAX));
    }

    if !(BUDGET_MIN..=BUDGET_MAX).contains(&request.breadth) {
        errors.push(format!(
            "breadth: must be between {} and {}",
            BUDGET_MIN, BUDGET_MAX
        ));
    }
    if !(BUDGET_MIN..=BUDGET_MAX).contains(&request.depth) {
        errors.push(format!(
            "depth: must be between {} and {}",
            BUDGET_MIN, BUDGET_MAX
        ));
    }

    for (i, qa) in request.questions.iter().enumerate() {
        if qa.question.trim().is_empty() {
            errors.push(format!("questions[{}].question: cannot be empty", i));
        }
        if qa.answer.trim().is_empty() {
            errors.push(format!("questions[{}].answer: cannot be empty", i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a topic submitted for clarifying-question generation.
pub fn validate_topic(topic: &str) -> Result<(), String> {
    let len = topic.trim().chars().count();
    if len < TOPIC_MIN {
        return Err(format!("topic: must be at least {} characters long", TOPIC_MIN));
    }
    if len > TOPIC_MAX {
        return Err(format!("topic: cannot exceed {} characters", TOPIC_MAX));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::QuestionAnswer;

    fn valid_request() -> CreateJobRequest {
        CreateJobRequest {
            topic: "benefits of spaced repetition".to_string(),
            breadth: 2,
            depth: 2,
            questions: vec![QuestionAnswer {
                question: "For which audience?".to_string(),
                answer: "Medical students".to_string(),
            }],
            direct_search: false,
            user: None,
        }
    }

    #[test]
    fn accepts_a_valid_request() {
        assert!(validate_create_request(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_short_topic() {
        let mut request = valid_request();
        request.topic = "ab".to_string();
        let errors = validate_create_request(&request).unwrap_err();
        assert!(errors.iter().any(|e| e.starts_with("topic:")));
    }

    #[test]
    fn rejects_out_of_range_budgets() {
        let mut request = valid_request();
        request.breadth = 0;
        request.depth = 6;
        let errors = validate_create_request(&request).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_empty_answers() {
        let mut request = valid_request();
        request.questions[0].answer = "  ".to_string();
        let errors = validate_create_request(&request).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("answer")));
    }

    #[test]
    fn topic_validation_bounds() {
        assert!(validate_topic("machine learning").is_ok());
        assert!(validate_topic("ab").is_err());
        assert!(validate_topic(&"x".repeat(1001)).is_err());
    }
}
