//! Scripted language models for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ModelError;
use crate::llm::{LanguageModel, Prompt};
use crate::tool::ToolSpec;

/// Replies with a fixed script, one entry per call, and records every prompt.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &Prompt, _tools: &[ToolSpec]) -> Result<String, ModelError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .ok_or_else(|| ModelError::Malformed("script exhausted".into()))
    }
}

type ReplyFn = dyn Fn(&Prompt, &[ToolSpec]) -> Result<String, ModelError> + Send + Sync;

/// Computes each reply from the prompt; useful when call order is not fixed.
pub struct FnModel {
    f: Box<ReplyFn>,
}

impl FnModel {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Prompt, &[ToolSpec]) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }
}

#[async_trait]
impl LanguageModel for FnModel {
    fn name(&self) -> &str {
        "fn"
    }

    async fn generate(&self, prompt: &Prompt, tools: &[ToolSpec]) -> Result<String, ModelError> {
        (self.f)(prompt, tools)
    }
}
