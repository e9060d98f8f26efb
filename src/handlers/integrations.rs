// Copyright (c) 2025 - Cowboy AI, Inc.

//! Synchronisation with third-party services and data exports

use tracing::{info, warn};

use super::{ParticipantEvent, WorkshopEvent};
use crate::registry::{HandlerUnit, Node, PACKAGE_ENTRY};

/// Exporters available per table
const EXPORTERS: &[(&str, &[&str])] = &[("applications", &["mlh-registered", "resume-book"])];

pub fn units() -> Vec<Node> {
    vec![
        Node::unit("shared", HandlerUnit::shared),
        Node::unit("on_sign_up", || {
            HandlerUnit::automated("authentication.sign_up").handler(on_sign_up)
        }),
        Node::unit("on_application_submitted", || {
            HandlerUnit::automated("registration.new_application").handler(on_application_submitted)
        }),
        Node::unit("on_application_accepted", || {
            HandlerUnit::automated("registration.accepted").handler(on_application_accepted)
        }),
        Node::unit("on_application_rejected", || {
            HandlerUnit::automated("registration.rejected").handler(on_application_rejected)
        }),
        Node::unit("on_event_updated", || {
            HandlerUnit::automated("workshops.updated").handler(on_event_updated)
        }),
        Node::unit("on_event_deleted", || {
            HandlerUnit::automated("workshops.deleted").handler(on_event_deleted)
        }),
        Node::unit("process_judging", || {
            HandlerUnit::manual().handler(process_judging)
        }),
        Node::directory(
            "export",
            vec![
                Node::unit(PACKAGE_ENTRY, || HandlerUnit::manual().handler(export)),
                Node::unit("applications", HandlerUnit::shared),
            ],
        ),
    ]
}

pub async fn on_sign_up(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "syncing new participant");
    Ok(())
}

pub async fn on_application_submitted(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "syncing submitted application");
    Ok(())
}

pub async fn on_application_accepted(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "syncing accepted application");
    Ok(())
}

pub async fn on_application_rejected(args: ParticipantEvent) -> anyhow::Result<()> {
    info!(participant_id = args.participant_id, "syncing rejected application");
    Ok(())
}

pub async fn on_event_updated(args: WorkshopEvent) -> anyhow::Result<()> {
    info!(event_id = args.event_id, "syncing updated workshop");
    Ok(())
}

pub async fn on_event_deleted(args: WorkshopEvent) -> anyhow::Result<()> {
    info!(event_id = args.event_id, "removing deleted workshop");
    Ok(())
}

crate::arguments! {
    #[derive(Debug)]
    pub struct ProcessJudging {
        // object key of the uploaded judging results
        pub file: String,
    }
}

/// Import judging results uploaded by organizers
pub async fn process_judging(args: ProcessJudging) -> anyhow::Result<()> {
    anyhow::ensure!(!args.file.is_empty(), "judging file key is empty");
    info!(file = %args.file, "processing judging results");
    Ok(())
}

crate::arguments! {
    #[derive(Debug)]
    pub struct Export {
        pub export_id: i64,
        pub table: String,
        pub kind: String,
    }
}

/// Whether an exporter exists for `table` and `kind`
pub fn has_exporter(table: &str, kind: &str) -> bool {
    EXPORTERS
        .iter()
        .any(|(name, kinds)| *name == table && kinds.contains(&kind))
}

/// Export a table to CSV
pub async fn export(args: Export) -> anyhow::Result<()> {
    if !has_exporter(&args.table, &args.kind) {
        warn!(
            export_id = args.export_id,
            table = %args.table,
            kind = %args.kind,
            "exporter does not exist"
        );
        return Ok(());
    }

    info!(
        export_id = args.export_id,
        table = %args.table,
        kind = %args.kind,
        "exporting table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("applications", "mlh-registered", true)]
    #[test_case("applications", "resume-book", true)]
    #[test_case("applications", "everything", false)]
    #[test_case("participants", "mlh-registered", false)]
    fn test_exporters(table: &str, kind: &str, exists: bool) {
        assert_eq!(has_exporter(table, kind), exists);
    }

    #[test]
    fn test_empty_judging_file_is_an_error() {
        let err = tokio_test::block_on(process_judging(ProcessJudging {
            file: String::new(),
        }))
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
