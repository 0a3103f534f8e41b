use std::fmt::Write;

use crate::llm::Prompt;
use crate::pipeline::{ExecutionResult, RenderedTask};
use crate::tool::ToolSpec;

/// One completed reasoning round.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub reply: String,
    pub observation: String,
}

pub(crate) fn system_prompt(role: &str, goal: &str, backstory: &str, tools: &[ToolSpec]) -> String {
    let mut out = format!("You are {role}. {backstory}\nYour personal goal is: {goal}\n");

    if tools.is_empty() {
        out.push_str(
            "\nTo give your best complete final answer to the task, use exactly this format:\n\n\
             Thought: I now can give a great answer\n\
             Final Answer: your complete answer, covering everything the expected output asks for.\n",
        );
        return out;
    }

    out.push_str("\nYou have access to the following tools and must not use any other:\n\n");
    for spec in tools {
        let _ = writeln!(out, "Tool Name: {}", spec.name);
        let _ = writeln!(out, "Tool Description: {}", spec.description);
        let _ = writeln!(out, "Tool Arguments: {}\n", spec.schema.to_json_schema());
    }

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    let _ = write!(
        out,
        "Use the following format:\n\n\
         Thought: what you should do next\n\
         Action: the tool to use, one of [{}]\n\
         Action Input: the tool arguments as a JSON object\n\
         Observation: the result of the tool\n\n\
         Repeat Thought/Action/Action Input/Observation as needed. Use one tool per reply and wait for its Observation.\n\
         When you have everything you need:\n\n\
         Thought: I now know the final answer\n\
         Final Answer: your complete answer, covering everything the expected output asks for.\n",
        names.join(", ")
    );
    out
}

pub(crate) fn user_prompt(task: &RenderedTask, context: &[&ExecutionResult], steps: &[Step]) -> String {
    let mut out = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.\n",
        task.description.trim(),
        task.expected_output.trim()
    );

    if !context.is_empty() {
        out.push_str("\nThis is the context you're working with:\n");
        for result in context {
            let _ = write!(out, "\n### {}\n{}\n", result.task_id, result.raw_text.trim());
        }
    }

    out.push_str("\nBegin! This is VERY important to you, use the tools available and give your best Final Answer.\n");

    for step in steps {
        let _ = write!(out, "\n{}\nObservation: {}\n", step.reply.trim(), step.observation);
    }
    out
}

pub(crate) fn build(
    role: &str,
    goal: &str,
    backstory: &str,
    tools: &[ToolSpec],
    task: &RenderedTask,
    context: &[&ExecutionResult],
    steps: &[Step],
) -> Prompt {
    Prompt::new(
        system_prompt(role, goal, backstory, tools),
        user_prompt(task, context, steps),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{FieldKind, InputSchema};

    fn rendered() -> RenderedTask {
        RenderedTask {
            task_id: "plan_itinerary".into(),
            description: "Plan 7 days in Kyoto".into(),
            expected_output: "Markdown itinerary".into(),
        }
    }

    #[test]
    fn test_system_prompt_lists_tools_with_schema() {
        let tools = vec![ToolSpec::new(
            "calculator",
            "Evaluates arithmetic",
            InputSchema::new().required("expression", FieldKind::String, "e.g. 200*7"),
        )];
        let s = system_prompt("Amazing Travel Concierge", "Plan trips", "Seasoned planner.", &tools);
        assert!(s.starts_with("You are Amazing Travel Concierge. Seasoned planner."));
        assert!(s.contains("Tool Name: calculator"));
        assert!(s.contains("\"required\":[\"expression\"]"));
        assert!(s.contains("one of [calculator]"));
    }

    #[test]
    fn test_system_prompt_without_tools_asks_for_final_answer() {
        let s = system_prompt("Principal Researcher", "Summarize", "Researcher.", &[]);
        assert!(!s.contains("Action:"));
        assert!(s.contains("Final Answer:"));
    }

    #[test]
    fn test_user_prompt_context_in_given_order_then_scratchpad() {
        let a = ExecutionResult::new("identify_city", "Kyoto");
        let b = ExecutionResult::new("gather_city_guide", "Temples and food");
        let steps = vec![Step {
            reply: "Action: calculator\nAction Input: {\"expression\": \"2+2\"}".into(),
            observation: "4".into(),
        }];
        let u = user_prompt(&rendered(), &[&a, &b], &steps);

        let ia = u.find("### identify_city").unwrap();
        let ib = u.find("### gather_city_guide").unwrap();
        let obs = u.find("Observation: 4").unwrap();
        assert!(ia < ib && ib < obs);
        assert!(u.starts_with("Current Task: Plan 7 days in Kyoto"));
    }
}
