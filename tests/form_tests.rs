mod common;

use std::cell::RefCell;

use recordgrid::state::form::{
    self, BatchProgress, CancelToken, FormDraft, ModalForm, ModalPhase, NoticeLevel,
    SubmitBlocked, ValidationError,
};
use recordgrid::state::statement::{GenerateStatementDraft, GroupDraft, ListingSettingsDraft};

use common::date;

fn january() -> GenerateStatementDraft {
    GenerateStatementDraft {
        start_date: Some(date(2026, 1, 1)),
        end_date: Some(date(2026, 1, 31)),
        ..GenerateStatementDraft::default()
    }
}

#[test]
fn test_missing_owner_blocks_submit() {
    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    modal.open(january());

    let result = modal.begin_submit();
    assert_eq!(
        result.err(),
        Some(SubmitBlocked::Invalid(ValidationError::MissingSelection(
            "an owner"
        )))
    );
    assert_eq!(modal.phase(), ModalPhase::Open);
    let notice = modal.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Please select an owner");
    assert!(modal.draft().requests().is_empty());
}

#[test]
fn test_generate_all_needs_no_owner() {
    let draft = GenerateStatementDraft {
        generate_all: true,
        owner_id: Some(4),
        property_ids: vec![1, 2],
        ..january()
    };
    assert_eq!(draft.validate(), Ok(()));
    let requests = draft.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].owner_id, None);
    assert_eq!(requests[0].property_id, None);
}

#[test]
fn test_date_range_validation() {
    let missing = GenerateStatementDraft {
        owner_id: Some(1),
        end_date: None,
        ..january()
    };
    assert_eq!(missing.validate(), Err(ValidationError::MissingDateRange));

    let reversed = GenerateStatementDraft {
        owner_id: Some(1),
        start_date: Some(date(2026, 2, 1)),
        ..january()
    };
    assert_eq!(reversed.validate(), Err(ValidationError::InvalidDateRange));
}

#[test]
fn test_one_request_per_distinct_property() {
    let draft = GenerateStatementDraft {
        owner_id: Some(1),
        property_ids: vec![5, 3, 5, 8],
        ..january()
    };
    let properties: Vec<Option<u64>> = draft.requests().iter().map(|r| r.property_id).collect();
    assert_eq!(properties, vec![Some(5), Some(3), Some(8)]);
}

#[test]
fn test_modal_lifecycle() {
    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    assert_eq!(modal.begin_submit().err(), Some(SubmitBlocked::NotOpen));
    assert!(!modal.update(|d| d.owner_id = Some(1)));

    modal.open(january());
    assert!(modal.update(|d| d.owner_id = Some(1)));
    let submission = modal.begin_submit().unwrap();
    assert_eq!(submission.draft.owner_id, Some(1));
    assert!(modal.is_submitting());
    assert_eq!(modal.begin_submit().err(), Some(SubmitBlocked::InFlight));
    assert!(!modal.update(|d| d.owner_id = Some(2)));

    modal.set_progress(BatchProgress {
        current: 1,
        total: 2,
    });
    assert_eq!(modal.progress().map(|p| p.percent()), Some(50));

    assert!(modal.finish(Ok(())));
    assert_eq!(modal.phase(), ModalPhase::Closed);
    assert_eq!(modal.draft(), &GenerateStatementDraft::default());
}

#[test]
fn test_failed_submit_returns_to_open_with_draft() {
    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    modal.open(GenerateStatementDraft {
        owner_id: Some(2),
        ..january()
    });
    modal.begin_submit().unwrap();

    assert!(!modal.finish(Err("server said no".to_string())));
    assert_eq!(modal.phase(), ModalPhase::Open);
    assert_eq!(modal.draft().owner_id, Some(2));
    assert_eq!(modal.notice().map(|n| n.message.as_str()), Some("server said no"));
}

#[test]
fn test_close_cancels_submission() {
    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    modal.open(GenerateStatementDraft {
        owner_id: Some(2),
        ..january()
    });
    let submission = modal.begin_submit().unwrap();
    assert!(!submission.cancel.is_cancelled());

    modal.close();
    assert!(submission.cancel.is_cancelled());
    assert!(!modal.finish(Ok(())));
}

#[tokio::test]
async fn test_batch_continues_past_failure() {
    let draft = GenerateStatementDraft {
        owner_id: Some(1),
        property_ids: vec![1, 2, 3, 4, 5],
        ..january()
    };
    let progress = RefCell::new(Vec::new());

    let report = form::run_sequential(
        draft.requests(),
        &CancelToken::never(),
        |p| progress.borrow_mut().push(p.current),
        |request| async move {
            if request.property_id == Some(3) {
                Err("listing inactive".to_string())
            } else {
                Ok(())
            }
        },
    )
    .await;

    assert_eq!(report.total, 5);
    assert_eq!(report.attempted, 5);
    assert_eq!(report.succeeded.len(), 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0.property_id, Some(3));
    assert!(!report.cancelled);
    assert_eq!(*progress.borrow(), vec![1, 2, 3, 4, 5]);
    assert_eq!(report.summary(), "4 of 5 succeeded, 1 failed");

    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    modal.open(draft);
    modal.begin_submit().unwrap();
    assert!(modal.finish(Ok(())));
}

#[tokio::test]
async fn test_cancel_stops_remaining_items() {
    let (handle, token) = form::cancel_pair();
    let calls = RefCell::new(0);

    let report = form::run_sequential(
        vec![1, 2, 3, 4],
        &token,
        |_| {},
        |item| {
            *calls.borrow_mut() += 1;
            if item == 2 {
                handle.cancel();
            }
            async { Ok::<(), String>(()) }
        },
    )
    .await;

    assert_eq!(*calls.borrow(), 2);
    assert_eq!(report.attempted, 2);
    assert!(report.cancelled);
    assert!(!report.is_complete_success());
    assert_eq!(report.summary(), "2 of 4 succeeded, cancelled");
}

#[test]
fn test_group_draft() {
    let blank = GroupDraft {
        name: "   ".to_string(),
        ..GroupDraft::default()
    };
    assert_eq!(
        blank.validate(),
        Err(ValidationError::MissingField("Group name"))
    );

    let draft = GroupDraft {
        name: "  Coast ".to_string(),
        listing_ids: vec![4, 1, 4],
        tags: vec![" Beach".to_string(), "beach".to_string(), "".to_string()],
    };
    let normalized = draft.normalized();
    assert_eq!(normalized.name, "Coast");
    assert_eq!(normalized.listing_ids, vec![1, 4]);
    assert_eq!(normalized.tags, vec!["beach"]);
}

#[test]
fn test_listing_settings_ranges() {
    let ok = ListingSettingsDraft {
        pm_fee_percent: 20.0,
        cleaning_fee: 85.0,
        ..ListingSettingsDraft::default()
    };
    assert_eq!(ok.validate(), Ok(()));

    let fee = ListingSettingsDraft {
        pm_fee_percent: 120.0,
        ..ok.clone()
    };
    assert_eq!(
        fee.validate().unwrap_err().to_string(),
        "PM fee must be between 0 and 100"
    );

    let cleaning = ListingSettingsDraft {
        cleaning_fee: -1.0,
        ..ok
    };
    assert!(cleaning.validate().is_err());
}

#[tokio::test]
async fn test_cancel_during_last_item_is_reported() {
    let (handle, token) = form::cancel_pair();

    let report = form::run_sequential(
        vec![1, 2],
        &token,
        |_| {},
        |item| {
            if item == 2 {
                handle.cancel();
            }
            async { Ok::<(), String>(()) }
        },
    )
    .await;

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, vec![1, 2]);
    assert!(report.cancelled);
    assert!(!report.is_complete_success());
}

#[test]
fn test_stale_submission_cannot_finish_reopened_modal() {
    let mut modal = ModalForm::<GenerateStatementDraft>::new();
    let draft = GenerateStatementDraft {
        owner_id: Some(2),
        ..january()
    };
    modal.open(draft.clone());
    let first = modal.begin_submit().unwrap();
    modal.close();

    modal.open(draft);
    let second = modal.begin_submit().unwrap();
    assert!(first.cancel.is_cancelled());
    assert!(!second.cancel.is_cancelled());
    assert!(modal.is_submitting());
}
