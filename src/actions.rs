// Action set: each menu operation makes at most one remote call and
// prints the result. Arguments are already collected by the dispatcher
// (see `ui::Action::collect`); only follow-up questions that depend on
// the action itself (upload purpose, which file to delete) are asked here.

use crate::api::{AssistantsApi, Purpose, ASSISTANT_LIST_LIMIT};
use crate::store::ThreadStore;
use crate::ui::{ask, pick_number, with_spinner, Pick, Prompt};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// A menu operation together with the arguments it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListAssistants,
    ListThreads,
    CreateThread,
    DeleteThread(String),
    ListMessages(String),
    ListFiles,
    UploadFile(String),
    /// `None` means "let the user pick from the file list".
    DeleteFile(Option<String>),
}

/// Everything an action needs, handed in by `main` instead of living in
/// globals: the API client, the thread store and the console.
pub struct Session<'a> {
    pub api: &'a dyn AssistantsApi,
    pub store: &'a ThreadStore,
    pub input: &'a mut dyn Prompt,
    pub out: &'a mut dyn Write,
}

impl Session<'_> {
    pub fn execute(&mut self, request: Request) -> Result<()> {
        match request {
            Request::ListAssistants => self.list_assistants(),
            Request::ListThreads => self.list_threads(),
            Request::CreateThread => self.create_thread(),
            Request::DeleteThread(id) => self.delete_thread(&id),
            Request::ListMessages(id) => self.list_messages(&id),
            Request::ListFiles => self.list_files(),
            Request::UploadFile(path) => self.upload_file(&path),
            Request::DeleteFile(id) => self.delete_file(id),
        }
    }

    fn list_assistants(&mut self) -> Result<()> {
        let api = self.api;
        let assistants = with_spinner("Fetching assistants...", || {
            api.list_assistants(ASSISTANT_LIST_LIMIT)
        })?;

        if assistants.is_empty() {
            writeln!(self.out, "No assistants available.")?;
        }
        for (i, assistant) in assistants.iter().enumerate() {
            let name = assistant.name.as_deref().unwrap_or("(unnamed)");
            writeln!(self.out, "{}. 🤖 {}  (id:{})", i + 1, name, assistant.id)?;
        }
        Ok(())
    }

    fn list_threads(&mut self) -> Result<()> {
        let thread_ids = self.store.load()?;
        if thread_ids.is_empty() {
            writeln!(self.out, "No thread IDs stored.")?;
            return Ok(());
        }
        writeln!(self.out, "Stored thread IDs:")?;
        for (i, id) in thread_ids.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, id)?;
        }
        Ok(())
    }

    fn create_thread(&mut self) -> Result<()> {
        let api = self.api;
        let thread = with_spinner("Creating a thread...", || api.create_thread())?;
        info!(thread_id = %thread.id, "created thread");
        writeln!(self.out, "Created a thread! id:{}", thread.id)?;
        self.store.append(&thread.id)?;
        Ok(())
    }

    // The local store keeps the id after a delete.
    fn delete_thread(&mut self, thread_id: &str) -> Result<()> {
        if thread_id.is_empty() {
            writeln!(
                self.out,
                "No thread ID provided. Please provide a valid thread ID."
            )?;
            return Ok(());
        }

        let api = self.api;
        let deletion = with_spinner(&format!("Deleting thread {}...", thread_id), || {
            api.delete_thread(thread_id)
        })?;
        if deletion.deleted {
            writeln!(self.out, "Thread deleted successfully!")?;
        } else {
            warn!(thread_id, "thread delete not confirmed");
            writeln!(self.out, "There was a problem.")?;
        }
        Ok(())
    }

    fn list_messages(&mut self, thread_id: &str) -> Result<()> {
        if thread_id.is_empty() {
            writeln!(
                self.out,
                "No thread ID provided. Please provide a valid thread ID."
            )?;
            return Ok(());
        }

        let api = self.api;
        let messages = with_spinner(
            &format!("Fetching messages for thread id:{}...", thread_id),
            || api.list_messages(thread_id),
        )?;

        if messages.is_empty() {
            writeln!(self.out, "This thread has no messages.")?;
        }
        for (i, message) in messages.iter().enumerate() {
            writeln!(
                self.out,
                "\n{}. {} - {}\n\"{}\"",
                i + 1,
                message.id,
                message.role,
                message.text()
            )?;
        }
        Ok(())
    }

    fn list_files(&mut self) -> Result<()> {
        let api = self.api;
        let files = with_spinner("Fetching files...", || api.list_files())?;

        if files.is_empty() {
            writeln!(self.out, "No files available.")?;
        }
        for (i, file) in files.iter().enumerate() {
            writeln!(self.out, "{}. {} - {}", i + 1, file.filename, file.id)?;
        }
        Ok(())
    }

    fn upload_file(&mut self, file_path: &str) -> Result<()> {
        if file_path.is_empty() {
            writeln!(
                self.out,
                "No file path provided. Please provide a valid file path."
            )?;
            return Ok(());
        }

        writeln!(self.out, "Select the purpose of the file upload:")?;
        writeln!(self.out, "1. Assistants (max 2m tokens)")?;
        writeln!(
            self.out,
            "2. Fine-tune (.jsonl, max size: 512MB, may incur costs)"
        )?;
        let purpose = Purpose::from_choice(&ask(self.input, "Enter your choice (1 or 2)")?);

        let path = Path::new(file_path);
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(file_path)
            .to_string();

        let api = self.api;
        let uploaded = with_spinner(&format!("Uploading {}...", file_name), || {
            api.upload_file(file, &file_name, purpose)
        })?;
        info!(file_id = %uploaded.id, purpose = purpose.as_str(), "uploaded file");
        writeln!(self.out, "{} uploaded! id:{}", uploaded.filename, uploaded.id)?;
        Ok(())
    }

    fn delete_file(&mut self, file_id: Option<String>) -> Result<()> {
        let file_id = match file_id {
            Some(id) => id,
            None => match self.pick_file()? {
                Some(id) => id,
                None => return Ok(()),
            },
        };

        let api = self.api;
        let deletion = with_spinner(&format!("Deleting file {}...", file_id), || {
            api.delete_file(&file_id)
        })?;
        writeln!(self.out, "{}: {}", file_id, deletion.deleted)?;
        Ok(())
    }

    /// List the files and let the user choose one by its number. Returns
    /// `None` (after saying why) when nothing usable was chosen.
    fn pick_file(&mut self) -> Result<Option<String>> {
        let api = self.api;
        let files = with_spinner("Fetching files...", || api.list_files())?;
        if files.is_empty() {
            writeln!(self.out, "No files available.")?;
            return Ok(None);
        }
        for (i, file) in files.iter().enumerate() {
            writeln!(self.out, "{}. {} - {}", i + 1, file.filename, file.id)?;
        }

        let answer = ask(self.input, "Enter the file number to delete")?;
        match pick_number(&answer, files.len()) {
            Pick::Index(i) => Ok(Some(files[i].id.clone())),
            Pick::OutOfRange => {
                writeln!(self.out, "Invalid file number.")?;
                Ok(None)
            }
            Pick::NotANumber => {
                writeln!(self.out, "Invalid input. Please enter a number.")?;
                Ok(None)
            }
        }
    }
}
