//! Test doubles for the menu and actions.

use crate::api::{
    ApiError, Assistant, AssistantsApi, Deletion, FileObject, Message, Purpose, Thread,
};
use crate::ui::Prompt;
use anyhow::{anyhow, Result};
use reqwest::StatusCode;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListAssistants(u32),
    CreateThread,
    DeleteThread(String),
    ListMessages(String),
    ListFiles,
    UploadFile(String, Purpose),
    DeleteFile(String),
}

/// In-memory `AssistantsApi` that records every call and answers from
/// canned data.
#[derive(Default)]
pub struct FakeApi {
    calls: RefCell<Vec<Call>>,
    assistants: Vec<Assistant>,
    thread_ids: RefCell<VecDeque<String>>,
    messages: Vec<Message>,
    files: Vec<FileObject>,
    not_deleting: bool,
    failing: bool,
}

impl FakeApi {
    pub fn with_assistants(mut self, assistants: Vec<Assistant>) -> Self {
        self.assistants = assistants;
        self
    }

    /// Ids handed out by successive `create_thread` calls.
    pub fn with_thread_ids(self, ids: &[&str]) -> Self {
        *self.thread_ids.borrow_mut() = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_files(mut self, files: Vec<FileObject>) -> Self {
        self.files = files;
        self
    }

    /// Deletes answer `deleted: false`.
    pub fn not_deleting(mut self) -> Self {
        self.not_deleting = true;
        self
    }

    /// Every call fails with a 500.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call, what: &'static str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        if self.failing {
            return Err(ApiError::Status {
                what,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "The server had an error while processing your request.".into(),
            });
        }
        Ok(())
    }

    fn deletion(&self, id: &str) -> Deletion {
        Deletion {
            id: id.to_string(),
            deleted: !self.not_deleting,
        }
    }
}

impl AssistantsApi for FakeApi {
    fn list_assistants(&self, limit: u32) -> Result<Vec<Assistant>, ApiError> {
        self.record(Call::ListAssistants(limit), "List assistants")?;
        Ok(self.assistants.clone())
    }

    fn create_thread(&self) -> Result<Thread, ApiError> {
        self.record(Call::CreateThread, "Create thread")?;
        let id = self
            .thread_ids
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| "thread_fake".to_string());
        Ok(Thread { id })
    }

    fn delete_thread(&self, thread_id: &str) -> Result<Deletion, ApiError> {
        self.record(Call::DeleteThread(thread_id.to_string()), "Delete thread")?;
        Ok(self.deletion(thread_id))
    }

    fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, ApiError> {
        self.record(Call::ListMessages(thread_id.to_string()), "List messages")?;
        Ok(self.messages.clone())
    }

    fn list_files(&self) -> Result<Vec<FileObject>, ApiError> {
        self.record(Call::ListFiles, "List files")?;
        Ok(self.files.clone())
    }

    fn upload_file(
        &self,
        _file: File,
        file_name: &str,
        purpose: Purpose,
    ) -> Result<FileObject, ApiError> {
        self.record(Call::UploadFile(file_name.to_string(), purpose), "Upload file")?;
        Ok(FileObject {
            id: "file_up".into(),
            filename: file_name.to_string(),
            purpose: Some(purpose.as_str().into()),
            bytes: None,
        })
    }

    fn delete_file(&self, file_id: &str) -> Result<Deletion, ApiError> {
        self.record(Call::DeleteFile(file_id.to_string()), "Delete file")?;
        Ok(self.deletion(file_id))
    }
}

/// `Prompt` fed from a fixed list of lines. Running out of lines is an
/// error, like a closed terminal.
pub struct Scripted {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl Scripted {
    pub fn new(lines: &[&str]) -> Self {
        Scripted {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Prompt for Scripted {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.lines
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted input left for prompt '{}'", prompt))
    }
}
