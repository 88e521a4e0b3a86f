use std::collections::HashMap;

use interlink_shared::GroupId;

use crate::request::RunnersCallback;

/// Receives what worker processes report about paragraph execution
pub trait ProcessListener: Send + Sync {
    /// A batched chunk of incremental output for one result slot
    fn on_output_append(&self, note_id: &str, paragraph_id: &str, index: usize, output: &str);

    /// Full replacement of one result slot
    fn on_output_updated(
        &self,
        note_id: &str,
        paragraph_id: &str,
        index: usize,
        output_type: &str,
        output: &str,
    );

    /// Every result slot of the paragraph is about to be replaced
    fn on_output_clear(&self, note_id: &str, paragraph_id: &str);

    /// A worker asked the controller to run a paragraph. Fire and forget.
    fn on_run_paragraph_requested(&self, group: &GroupId, note_id: &str, paragraph_id: &str);

    fn on_meta_infos_received(&self, setting_id: &str, infos: HashMap<String, String>);

    /// A worker asked which paragraphs would run after this one. The answer
    /// goes through `callback`, from any thread, at any later time before
    /// the request expires.
    fn on_resource_runners_requested(
        &self,
        note_id: &str,
        paragraph_id: &str,
        callback: RunnersCallback,
    );
}

/// Receives output and status of applications a paragraph started
pub trait ApplicationListener: Send + Sync {
    fn on_output_append(
        &self,
        note_id: &str,
        paragraph_id: &str,
        index: usize,
        app_id: &str,
        output: &str,
    );

    fn on_output_updated(
        &self,
        note_id: &str,
        paragraph_id: &str,
        index: usize,
        app_id: &str,
        output_type: &str,
        output: &str,
    );

    fn on_status_change(&self, note_id: &str, paragraph_id: &str, app_id: &str, status: &str);
}
