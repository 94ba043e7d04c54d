use crate::{
    core::{
        agent::Agent,
        memory::AgentMemory,
        steps::AgentStep,
        tool_call::{raw_arguments, raw_id, raw_name, ToolCall, ToolExecution},
    },
    error::{PlannerError, Result},
    types::result::{RunResult, TokenUsage},
};
use serde_json::Value;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info};

impl Agent {
    /// Run the loop and return only the final text
    pub async fn run(&self, prompt: &str) -> Result<String> {
        self.run_with_steps(prompt).await.map(|result| result.output)
    }

    /// Reason, optionally call tools, repeat, until the model answers without tool calls.
    pub async fn run_with_steps(&self, prompt: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(self.system_prompt().map(str::to_string));
        memory.add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        let mut token_usage: Option<TokenUsage> = None;

        for iteration in 1..=self.max_iterations() {
            let request = self.build_request(memory.as_messages());

            let turn = timeout(self.timeout(), self.backend().complete(&request))
                .await
                .map_err(|_| PlannerError::Timeout("chat completion call timed out".to_string()))??;

            if let Some(usage) = turn.usage.as_ref() {
                token_usage = Some(match token_usage {
                    Some(total) => total.add(usage),
                    None => usage.clone(),
                });
            }

            let tool_calls = turn.tool_calls();
            if tool_calls.is_empty() {
                let answer = turn.content().trim();
                if answer.is_empty() {
                    return Err(PlannerError::EmptyResponse);
                }

                memory.add_step(AgentStep::FinalAnswer {
                    answer: answer.to_string(),
                });
                info!(
                    target: "trip_planner::agent",
                    iterations = iteration,
                    actions = memory.count_actions(),
                    "agent finished"
                );

                return Ok(RunResult::new(
                    answer.to_string(),
                    memory.into_steps(),
                    token_usage,
                    start_time.elapsed(),
                    iteration,
                ));
            }

            debug!(
                target: "trip_planner::agent",
                iteration,
                tool_calls = tool_calls.len(),
                "model requested tools"
            );

            for raw_call in tool_calls {
                self.execute_tool_call(raw_call, &mut memory).await;
            }
        }

        Err(PlannerError::MaxIterations(self.max_iterations()))
    }

    /// Execute one requested call and record it. Failures become error observations.
    async fn execute_tool_call(&self, raw_call: &Value, memory: &mut AgentMemory) {
        let call = match ToolCall::from_openai_format(raw_call) {
            Ok(call) => call,
            Err(err) => {
                let tool_call_id = raw_id(raw_call).to_string();
                memory.add_step(AgentStep::Action {
                    tool_name: raw_name(raw_call).to_string(),
                    tool_call_id: tool_call_id.clone(),
                    arguments: Value::String(raw_arguments(raw_call).to_string()),
                });
                memory.add_step(AgentStep::Observation {
                    tool_call_id,
                    result: err.to_error_payload().to_string(),
                    is_error: true,
                });
                return;
            }
        };

        memory.add_step(AgentStep::Action {
            tool_name: call.name.clone(),
            tool_call_id: call.id.clone(),
            arguments: call.arguments.clone(),
        });

        let arguments = call.arguments.clone();
        let name = call.name.clone();
        let execution = ToolExecution::start(call);
        let output = execution.finish(self.tools().execute(&name, arguments).await);

        debug!(
            target: "trip_planner::agent",
            tool = output.tool_name.as_str(),
            duration_ms = output.duration_ms.unwrap_or_default() as u64,
            is_error = output.is_error,
            "tool finished"
        );

        memory.add_step(AgentStep::Observation {
            tool_call_id: output.tool_call_id.clone(),
            result: output.as_string(),
            is_error: output.is_error,
        });
    }
}
