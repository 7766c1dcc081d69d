#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use strum::VariantNames;
use tokio::fs;
use tokio::io;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::domain::models::Action;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Document;
use crate::domain::models::DocumentStatus;
use crate::domain::models::Event;
use crate::domain::models::FileUpload;
use crate::domain::models::SlashCommand;
use crate::domain::models::UploadEvent;
use crate::domain::services::actions::help_text;
use crate::domain::services::responses::QUICK_PROMPTS;
use crate::domain::services::AuthService;
use crate::domain::services::DocumentStore;
use crate::domain::services::PortalSession;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Info(String),
    Assistant(String),
    Success(String),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn format_document(doc: &Document) -> String {
    let mut res = format!("- {} {} [{}]", doc.id, doc.name, doc.status);

    if let Some(progress) = doc.upload_progress {
        res = format!("{res} uploading {progress:.0}%");
    }
    if let Some(file_name) = &doc.file_name {
        res = format!("{res}, {file_name}");
        if let Some(size) = doc.file_size_mb {
            res = format!("{res} ({size:.1} MB)");
        }
    }
    if let Some(date) = doc.last_updated {
        res = format!("{res}, updated {}", date.format("%b %-d, %Y"));
    }
    if let Some(reason) = &doc.rejection_reason {
        res = format!("{res}\n    Rejected: {reason}");
    }

    return res;
}

async fn read_upload(file_path: &str) -> Result<FileUpload, Output> {
    let metadata = match fs::metadata(file_path).await {
        Ok(metadata) => metadata,
        Err(err) => {
            return Err(Output::Error(format!("Could not read {file_path}: {err}")));
        }
    };

    let name = path::Path::new(file_path)
        .file_name()
        .map(|name| return name.to_string_lossy().to_string())
        .unwrap_or_else(|| return file_path.to_string());

    return Ok(FileUpload::new(&name, metadata.len()));
}

pub fn welcome() -> Vec<Output> {
    let mut res = vec![Output::Info(
        "Welcome to CampusFlow. Sign in with /login ROLE EMAIL PASSWORD, or type /help for every command.".to_string(),
    )];

    res.push(Output::Info("Once signed in, try asking:".to_string()));
    for prompt in QUICK_PROMPTS {
        res.push(Output::Info(format!("  - {prompt}")));
    }

    return res;
}

/// Line oriented front-end state. Turns input lines into `Action`s and
/// `Event`s into printable output.
pub struct Repl {
    auth: AuthService,
    documents: DocumentStore,
    session: Option<PortalSession>,
    waiting_for_backend: bool,
    tx: mpsc::UnboundedSender<Action>,
}

impl Repl {
    pub fn new(documents: DocumentStore, tx: mpsc::UnboundedSender<Action>) -> Repl {
        return Repl {
            auth: AuthService::default(),
            documents,
            session: None,
            waiting_for_backend: false,
            tx,
        };
    }

    fn document_name(&self, document_id: &str) -> String {
        return self
            .documents
            .get(document_id)
            .map(|doc| return doc.name)
            .unwrap_or_else(|| return document_id.to_string());
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<(Flow, Vec<Output>)> {
        let command = SlashCommand::parse(line);
        if let Some(command) = &command {
            if command.is_quit() {
                return Ok((Flow::Quit, vec![]));
            }
            if command.is_help() {
                return Ok((Flow::Continue, vec![Output::Info(help_text())]));
            }
            if command.is_login() {
                return Ok((Flow::Continue, self.login(&command.args)));
            }
        }

        if self.session.is_none() {
            if line.trim().is_empty() {
                return Ok((Flow::Continue, vec![]));
            }
            return Ok((
                Flow::Continue,
                vec![Output::Error(
                    "Please sign in first with /login ROLE EMAIL PASSWORD.".to_string(),
                )],
            ));
        }

        let outputs = match command {
            Some(command) if command.is_logout() => self.logout()?,
            Some(command) if command.is_docs() => self.docs(&command.args),
            Some(command) if command.is_upload() => self.upload(&command.args).await?,
            Some(command) if command.is_bulk_upload() => self.bulk_upload(&command.args).await?,
            Some(command) if command.is_cancel() => self.cancel(&command.args)?,
            Some(command) if command.is_reject() => self.reject(&command.args)?,
            Some(command) if command.is_notifications() => self.notifications(),
            Some(command) if command.is_tasks() => self.tasks(),
            _ => self.chat(line)?,
        };

        return Ok((Flow::Continue, outputs));
    }

    fn login(&mut self, args: &[String]) -> Vec<Output> {
        if let Some(session) = &self.session {
            return vec![Output::Error(format!(
                "Already signed in as {}. Use /logout first.",
                session.user.name
            ))];
        }

        if args.len() != 3 {
            return vec![Output::Error(
                "Usage: /login ROLE EMAIL PASSWORD (ROLE is student or admin)".to_string(),
            )];
        }

        let user = match self.auth.login(&args[1], &args[2], &args[0]) {
            Some(user) => user,
            None => {
                return vec![Output::Error(
                    "Invalid email, password or role.".to_string(),
                )];
            }
        };

        let session = PortalSession::new(user, self.documents.clone());
        let mut res = session
            .chat
            .messages()
            .iter()
            .map(|msg| return Output::Assistant(msg.content().to_string()))
            .collect::<Vec<Output>>();

        let unread = session.unread_notifications();
        if unread > 0 {
            res.push(Output::Info(format!(
                "You have {unread} unread notifications. See /notifications."
            )));
        }
        if session.can_reject() {
            res.push(Output::Info(
                "Signed in as admin, /reject is available.".to_string(),
            ));
        }

        self.session = Some(session);
        return res;
    }

    fn logout(&mut self) -> Result<Vec<Output>> {
        if self.waiting_for_backend {
            self.tx.send(Action::BackendAbort())?;
            self.waiting_for_backend = false;
        }
        self.session = None;

        return Ok(vec![Output::Info("Signed out.".to_string())]);
    }

    fn docs(&self, args: &[String]) -> Vec<Output> {
        let mut status = None;
        if let Some(arg) = args.first() {
            status = DocumentStatus::parse(arg);
            if status.is_none() {
                return vec![Output::Error(format!(
                    "Unknown status {arg}. Use one of: {}",
                    DocumentStatus::VARIANTS.join(", ")
                ))];
            }
        }

        let docs = self.documents.filter(status);
        if docs.is_empty() {
            return vec![Output::Info("No documents found.".to_string())];
        }

        let mut res = docs
            .iter()
            .map(|doc| return Output::Info(format_document(doc)))
            .collect::<Vec<Output>>();

        let summary = self.documents.summary();
        res.push(Output::Info(format!(
            "Verified {}/{} required documents.",
            summary.verified, summary.required
        )));
        if summary.all_required_verified {
            res.push(Output::Success(
                "All required documents are verified!".to_string(),
            ));
        }

        return res;
    }

    async fn upload(&self, args: &[String]) -> Result<Vec<Output>> {
        if args.len() < 2 {
            return Ok(vec![Output::Error(
                "Usage: /upload DOC_ID PATH".to_string(),
            )]);
        }

        let file = match read_upload(&args[1..].join(" ")).await {
            Ok(file) => file,
            Err(output) => return Ok(vec![output]),
        };

        self.tx
            .send(Action::UploadSubmit(args[0].to_string(), file))?;
        return Ok(vec![]);
    }

    async fn bulk_upload(&self, args: &[String]) -> Result<Vec<Output>> {
        if args.is_empty() {
            return Ok(vec![Output::Error("Usage: /bulk PATH...".to_string())]);
        }

        let mut res = vec![];
        let mut files = vec![];
        for arg in args {
            match read_upload(arg).await {
                Ok(file) => files.push(file),
                Err(output) => res.push(output),
            }
        }

        if !files.is_empty() {
            self.tx.send(Action::UploadBulk(files))?;
        }

        return Ok(res);
    }

    fn cancel(&self, args: &[String]) -> Result<Vec<Output>> {
        if args.len() != 1 {
            return Ok(vec![Output::Error(
                "Usage: /cancel DOC_ID".to_string(),
            )]);
        }

        self.tx.send(Action::UploadCancel(args[0].to_string()))?;
        return Ok(vec![]);
    }

    fn reject(&self, args: &[String]) -> Result<Vec<Output>> {
        let can_reject = self
            .session
            .as_ref()
            .map(|session| return session.can_reject())
            .unwrap_or(false);
        if !can_reject {
            return Ok(vec![Output::Error(
                "Only admins can reject documents.".to_string(),
            )]);
        }

        if args.len() < 2 {
            return Ok(vec![Output::Error(
                "Usage: /reject DOC_ID REASON...".to_string(),
            )]);
        }

        self.tx.send(Action::DocumentReject(
            args[0].to_string(),
            args[1..].join(" "),
        ))?;
        return Ok(vec![]);
    }

    fn notifications(&mut self) -> Vec<Output> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return vec![],
        };

        let res = session
            .notifications
            .iter()
            .map(|notification| {
                let marker = if notification.read { " " } else { "*" };
                return Output::Info(format!(
                    "{marker} [{}] {}: {} ({})",
                    notification.kind,
                    notification.title,
                    notification.description,
                    notification.time
                ));
            })
            .collect::<Vec<Output>>();

        session.mark_notifications_read();
        return res;
    }

    fn tasks(&self) -> Vec<Output> {
        let session = match self.session.as_ref() {
            Some(session) => session,
            None => return vec![],
        };

        let mut res = session
            .tasks
            .iter()
            .map(|task| {
                return Output::Info(format!(
                    "- [{}] {}: {} ({})",
                    task.status.label(),
                    task.title,
                    task.description,
                    task.due
                ));
            })
            .collect::<Vec<Output>>();

        res.push(Output::Info(format!(
            "Onboarding progress: {}% ({}/{} tasks done)",
            session.task_progress(),
            session.completed_tasks(),
            session.tasks.len()
        )));

        if !session.events.is_empty() {
            res.push(Output::Info("Upcoming events:".to_string()));
            for event in session.events.iter() {
                res.push(Output::Info(format!(
                    "  - {}, {} at {}",
                    event.title, event.date, event.time
                )));
            }
        }

        return res;
    }

    fn chat(&mut self, line: &str) -> Result<Vec<Output>> {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return Ok(vec![]),
        };

        if self.waiting_for_backend {
            return Ok(vec![Output::Error(
                "The assistant is still typing, hang on.".to_string(),
            )]);
        }

        if session.chat.push_user(line).is_none() {
            return Ok(vec![]);
        }

        self.tx
            .send(Action::BackendRequest(BackendPrompt::new(line)))?;
        self.waiting_for_backend = true;

        return Ok(vec![Output::Info(
            "CampusFlow AI is typing...".to_string(),
        )]);
    }

    pub fn handle_event(&mut self, event: Event) -> Vec<Output> {
        match event {
            Event::BackendPromptResponse(res) => {
                if res.done {
                    self.waiting_for_backend = false;
                }
                if let Some(session) = self.session.as_mut() {
                    session.chat.push_assistant(&res.text);
                    return vec![Output::Assistant(res.text)];
                }
                return vec![];
            }
            Event::Upload(upload_event) => {
                return vec![self.upload_output(upload_event)];
            }
            Event::Notice(text) => {
                return vec![Output::Info(text)];
            }
            Event::Failure(text) => {
                return vec![Output::Error(text)];
            }
        }
    }

    fn upload_output(&self, event: UploadEvent) -> Output {
        let name = self.document_name(event.document_id());

        match event {
            UploadEvent::Started { file_name, .. } => {
                return Output::Info(format!("Uploading {file_name} for {name}..."));
            }
            UploadEvent::Progress { progress, .. } => {
                return Output::Info(format!("{name}: {progress:.0}%"));
            }
            UploadEvent::UnderReview { .. } => {
                return Output::Info(format!("{name} uploaded, now under review."));
            }
            UploadEvent::Settled { status, .. } => {
                if status == DocumentStatus::Verified {
                    return Output::Success(format!("{name} verified."));
                }
                return Output::Info(format!(
                    "{name} is {status} and waiting for a manual check."
                ));
            }
            UploadEvent::Cancelled { .. } => {
                return Output::Info(format!("Upload for {name} cancelled."));
            }
            UploadEvent::Rejected { reason, .. } => {
                return Output::Error(format!("{name} rejected: {reason}"));
            }
        }
    }
}

fn print_outputs(outputs: &[Output]) {
    for output in outputs {
        match output {
            Output::Info(text) => println!("{text}"),
            Output::Assistant(text) => println!("{}", Paint::cyan(text)),
            Output::Success(text) => println!("{}", Paint::green(text)),
            Output::Error(text) => println!("{}", Paint::red(text)),
        }
    }
}

pub async fn start(
    documents: DocumentStore,
    tx: mpsc::UnboundedSender<Action>,
    mut rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut repl = Repl::new(documents, tx);
    let mut lines = io::BufReader::new(io::stdin()).lines();

    print_outputs(&welcome());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => return Ok(()),
                };

                let (flow, outputs) = repl.handle_line(&line).await?;
                print_outputs(&outputs);
                if flow == Flow::Quit {
                    return Ok(());
                }
            }
            event = rx.recv() => {
                match event {
                    Some(event) => print_outputs(&repl.handle_event(event)),
                    None => return Ok(()),
                }
            }
        }
    }
}
