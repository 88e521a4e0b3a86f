//! Listeners that record every call, in order, for later assertions

use std::collections::HashMap;
use std::sync::Mutex;

use interlink_server::{ApplicationListener, ProcessListener, RunnersCallback};
use interlink_shared::{GroupId, ObjectKey, ParagraphRef, RegistryListener, ReplicatedObject};

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessCall {
    Append { note_id: String, paragraph_id: String, index: usize, output: String },
    Updated { note_id: String, paragraph_id: String, index: usize, output_type: String, output: String },
    Clear { note_id: String, paragraph_id: String },
    RunParagraph { group: GroupId, note_id: String, paragraph_id: String },
    MetaInfos { setting_id: String, infos: HashMap<String, String> },
    RunnersRequested { note_id: String, paragraph_id: String, owner_key: String },
}

/// What the process listener does with a runners request
#[derive(Clone, Debug)]
pub enum RunnersReply {
    /// Completes the callback immediately with these runners
    Answer(Vec<ParagraphRef>),
    /// Keeps the callback for the test to resolve via `take_held_callbacks`
    Hold,
    /// Calls `fail` on the callback
    Fail,
    /// Drops the callback without resolving it
    Drop,
}

pub struct RecordingProcessListener {
    calls: Mutex<Vec<ProcessCall>>,
    runners_reply: Mutex<RunnersReply>,
    held: Mutex<Vec<RunnersCallback>>,
    panic_on_paragraph: Mutex<Option<String>>,
}

impl Default for RecordingProcessListener {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            runners_reply: Mutex::new(RunnersReply::Hold),
            held: Mutex::new(Vec::new()),
            panic_on_paragraph: Mutex::new(None),
        }
    }
}

impl RecordingProcessListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_runners_reply(&self, reply: RunnersReply) {
        *self.runners_reply.lock().unwrap() = reply;
    }

    /// Run requests for this paragraph panic inside the listener
    pub fn panic_on_paragraph(&self, paragraph_id: &str) {
        *self.panic_on_paragraph.lock().unwrap() = Some(paragraph_id.to_string());
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn appends(&self) -> Vec<(String, usize, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProcessCall::Append { paragraph_id, index, output, .. } => {
                    Some((paragraph_id, index, output))
                }
                _ => None,
            })
            .collect()
    }

    pub fn run_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProcessCall::RunParagraph { paragraph_id, .. } => Some(paragraph_id),
                _ => None,
            })
            .collect()
    }

    pub fn take_held_callbacks(&self) -> Vec<RunnersCallback> {
        std::mem::take(&mut *self.held.lock().unwrap())
    }

    fn record(&self, call: ProcessCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ProcessListener for RecordingProcessListener {
    fn on_output_append(&self, note_id: &str, paragraph_id: &str, index: usize, output: &str) {
        self.record(ProcessCall::Append {
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
            index,
            output: output.to_string(),
        });
    }

    fn on_output_updated(
        &self,
        note_id: &str,
        paragraph_id: &str,
        index: usize,
        output_type: &str,
        output: &str,
    ) {
        self.record(ProcessCall::Updated {
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
            index,
            output_type: output_type.to_string(),
            output: output.to_string(),
        });
    }

    fn on_output_clear(&self, note_id: &str, paragraph_id: &str) {
        self.record(ProcessCall::Clear {
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
        });
    }

    fn on_run_paragraph_requested(&self, group: &GroupId, note_id: &str, paragraph_id: &str) {
        let panics = self.panic_on_paragraph.lock().unwrap().as_deref() == Some(paragraph_id);
        if panics {
            panic!("listener refused paragraph {}", paragraph_id);
        }
        self.record(ProcessCall::RunParagraph {
            group: group.clone(),
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
        });
    }

    fn on_meta_infos_received(&self, setting_id: &str, infos: HashMap<String, String>) {
        self.record(ProcessCall::MetaInfos {
            setting_id: setting_id.to_string(),
            infos,
        });
    }

    fn on_resource_runners_requested(
        &self,
        note_id: &str,
        paragraph_id: &str,
        callback: RunnersCallback,
    ) {
        self.record(ProcessCall::RunnersRequested {
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
            owner_key: callback.owner_key().to_string(),
        });
        let reply = self.runners_reply.lock().unwrap().clone();
        match reply {
            RunnersReply::Answer(runners) => {
                let _ = callback.complete(runners);
            }
            RunnersReply::Hold => self.held.lock().unwrap().push(callback),
            RunnersReply::Fail => callback.fail("listener could not compute runners"),
            RunnersReply::Drop => drop(callback),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppCall {
    Append { app_id: String, index: usize, output: String },
    Updated { app_id: String, index: usize, output_type: String, output: String },
    Status { app_id: String, status: String },
}

#[derive(Default)]
pub struct RecordingApplicationListener {
    calls: Mutex<Vec<AppCall>>,
}

impl RecordingApplicationListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AppCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ApplicationListener for RecordingApplicationListener {
    fn on_output_append(&self, _: &str, _: &str, index: usize, app_id: &str, output: &str) {
        self.calls.lock().unwrap().push(AppCall::Append {
            app_id: app_id.to_string(),
            index,
            output: output.to_string(),
        });
    }

    fn on_output_updated(
        &self,
        _: &str,
        _: &str,
        index: usize,
        app_id: &str,
        output_type: &str,
        output: &str,
    ) {
        self.calls.lock().unwrap().push(AppCall::Updated {
            app_id: app_id.to_string(),
            index,
            output_type: output_type.to_string(),
            output: output.to_string(),
        });
    }

    fn on_status_change(&self, _: &str, _: &str, app_id: &str, status: &str) {
        self.calls.lock().unwrap().push(AppCall::Status {
            app_id: app_id.to_string(),
            status: status.to_string(),
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegistryCall {
    Add { group: GroupId, name: String },
    Update { group: GroupId, name: String, value: serde_json::Value },
    Remove { group: GroupId, name: String },
}

#[derive(Default)]
pub struct RecordingRegistryListener {
    calls: Mutex<Vec<RegistryCall>>,
}

impl RecordingRegistryListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl RegistryListener for RecordingRegistryListener {
    fn on_add(&self, group: &GroupId, object: &ReplicatedObject) {
        self.calls.lock().unwrap().push(RegistryCall::Add {
            group: group.clone(),
            name: object.name.clone(),
        });
    }

    fn on_update(&self, group: &GroupId, object: &ReplicatedObject) {
        self.calls.lock().unwrap().push(RegistryCall::Update {
            group: group.clone(),
            name: object.name.clone(),
            value: object.value.clone(),
        });
    }

    fn on_remove(&self, group: &GroupId, key: &ObjectKey) {
        self.calls.lock().unwrap().push(RegistryCall::Remove {
            group: group.clone(),
            name: key.name.clone(),
        });
    }
}
