use clap::Parser;
use pretty_assertions::assert_eq;
use shoplist_core::db::PendingSummary;
use shoplist_core::{
    ItemFilter, ItemSort, ShoppingItem, ShoppingService, SyncConfig, SyncReport, SyncStatus,
};

use crate::cli::{Cli, Commands, FilterArg, SortArg};
use crate::commands::add::run_add;
use crate::commands::common::{
    format_item_lines, format_pending_summary, format_relative_time, format_sync_report,
    normalize_item_identifier, normalize_name, normalize_text, resolve_item, short_id,
};
use crate::commands::delete::run_delete;
use crate::commands::edit::ItemEdit;
use crate::commands::sync::run_sync;
use crate::commands::toggle::run_toggle;
use crate::error::CliError;

fn quiet_config() -> SyncConfig {
    SyncConfig {
        network_delay_ms: 0,
        failure_rate: 0.0,
        ..SyncConfig::default()
    }
}

fn item_with_id(id: &str, name: &str) -> ShoppingItem {
    ShoppingItem {
        id: id.parse().unwrap(),
        ..ShoppingItem::new(name, 1)
    }
}

#[test]
fn normalize_text_trims_and_rejects_empty() {
    assert_eq!(normalize_text("  milk  "), Some("milk".to_string()));
    assert_eq!(normalize_text(" \n\t "), None);
}

#[test]
fn normalize_name_joins_words() {
    let parts = vec!["  oat".to_string(), "milk ".to_string()];
    assert_eq!(normalize_name(&parts).unwrap(), "oat milk");
    assert!(matches!(
        normalize_name(&[" ".to_string()]),
        Err(CliError::EmptyName)
    ));
}

#[test]
fn normalize_item_identifier_rejects_empty() {
    assert!(matches!(
        normalize_item_identifier(" \n "),
        Err(CliError::EmptyItemId)
    ));
    assert_eq!(normalize_item_identifier("  abc123  ").unwrap(), "abc123");
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
    assert_eq!(format_relative_time(now - 14 * 24 * 60 * 60_000, now), "2w ago");
}

#[test]
fn short_id_keeps_time_prefix() {
    assert_eq!(
        short_id("11111111-1111-7111-8111-111111111111"),
        "11111111-1111"
    );
    assert_eq!(short_id("abc"), "abc");
}

#[test]
fn item_lines_show_bought_marker_and_note() {
    let mut bought = ShoppingItem::new("Eggs", 12).with_note("free range");
    bought.is_bought = true;
    let open = ShoppingItem::new("Bread", 1);

    let lines = format_item_lines(&[bought, open]);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("[x] Eggs"));
    assert!(lines[0].contains("x12"));
    assert!(lines[0].ends_with("(free range)"));
    assert!(lines[1].contains("[ ] Bread"));
    assert!(lines[1].ends_with("just now"));
}

#[test]
fn pending_summary_and_report_messages() {
    assert_eq!(
        format_pending_summary(PendingSummary::default()),
        "Everything is synced"
    );
    assert_eq!(
        format_pending_summary(PendingSummary {
            creates: 2,
            updates: 1,
            deletes: 0,
        }),
        "3 pending change(s): 2 to create, 1 to update, 0 to delete"
    );
    assert_eq!(
        format_sync_report(&SyncReport {
            attempts: 2,
            created: 1,
            updated: 0,
            deleted: 3,
        }),
        "Sync completed in 2 attempts: 1 created, 0 updated, 3 deleted"
    );
}

#[test]
fn list_defaults_to_not_bought_newest_first() {
    let cli = Cli::try_parse_from(["shoplist", "list"]).unwrap();
    let Commands::List {
        filter,
        search,
        sort,
        json,
    } = cli.command
    else {
        panic!("expected list command");
    };

    assert_eq!(filter, FilterArg::NotBought);
    assert_eq!(ItemFilter::from(filter), ItemFilter::NotBought);
    assert_eq!(sort, SortArg::CreatedDesc);
    assert_eq!(ItemSort::from(sort), ItemSort::CreatedAtDesc);
    assert_eq!(search, None);
    assert!(!json);
}

#[test]
fn sort_and_filter_args_map_to_core_values() {
    let cli = Cli::try_parse_from([
        "shoplist",
        "list",
        "--filter",
        "bought",
        "--sort",
        "updated-asc",
        "--search",
        "milk",
    ])
    .unwrap();
    let Commands::List {
        filter,
        search,
        sort,
        ..
    } = cli.command
    else {
        panic!("expected list command");
    };

    assert_eq!(ItemFilter::from(filter), ItemFilter::Bought);
    assert_eq!(ItemSort::from(sort), ItemSort::UpdatedAtAsc);
    assert_eq!(search.as_deref(), Some("milk"));
}

#[test]
fn argument_validation() {
    assert!(Cli::try_parse_from(["shoplist", "add", "milk", "-q", "-1"]).is_err());
    assert!(Cli::try_parse_from(["shoplist", "add"]).is_err());
    assert!(
        Cli::try_parse_from(["shoplist", "edit", "abc", "--note", "x", "--clear-note"]).is_err()
    );
    assert!(Cli::try_parse_from(["shoplist", "--db-path", "/tmp/x.db", "status"]).is_ok());
}

#[test]
fn item_edit_applies_requested_fields() {
    let item = ShoppingItem::new("Tea", 1).with_note("green");

    let edit = ItemEdit {
        name: Some("  Black tea ".to_string()),
        quantity: Some(3),
        ..ItemEdit::default()
    };
    let edited = edit.apply(&item).unwrap();
    assert_eq!(edited.name, "Black tea");
    assert_eq!(edited.quantity, 3);
    assert_eq!(edited.note.as_deref(), Some("green"));

    let cleared = ItemEdit {
        clear_note: true,
        ..ItemEdit::default()
    };
    assert_eq!(cleared.apply(&item).unwrap().note, None);

    let blank_note = ItemEdit {
        note: Some("   ".to_string()),
        ..ItemEdit::default()
    };
    assert_eq!(blank_note.apply(&item).unwrap().note, None);

    let blank_name = ItemEdit {
        name: Some(" ".to_string()),
        ..ItemEdit::default()
    };
    assert!(matches!(blank_name.apply(&item), Err(CliError::EmptyName)));

    assert!(ItemEdit::default().is_empty());
    assert!(!cleared.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_item_supports_exact_and_prefix_id() {
    let service = ShoppingService::open_in_memory(&quiet_config())
        .await
        .unwrap();
    let item_a = item_with_id("11111111-1111-7111-8111-111111111111", "Apples");
    let item_b = item_with_id("11111111-1111-7111-8111-222222222222", "Bananas");
    service.add_item(&item_a).await.unwrap();
    service.add_item(&item_b).await.unwrap();

    let exact = resolve_item("11111111-1111-7111-8111-111111111111", &service)
        .await
        .unwrap();
    assert_eq!(exact.id, item_a.id);

    let by_prefix = resolve_item("11111111-1111-7111-8111-2", &service)
        .await
        .unwrap();
    assert_eq!(by_prefix.id, item_b.id);

    let ambiguous = resolve_item("11111111", &service).await.unwrap_err();
    assert!(matches!(ambiguous, CliError::AmbiguousItemId(_)));
    assert!(ambiguous.to_string().contains("11111111-1111"));

    let missing = resolve_item("ffff", &service).await.unwrap_err();
    assert!(matches!(missing, CliError::ItemNotFound(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_item_ignores_deleted_items() {
    let service = ShoppingService::open_in_memory(&quiet_config())
        .await
        .unwrap();
    let item = item_with_id("22222222-2222-7222-8222-222222222222", "Jam");
    service.add_item(&item).await.unwrap();
    service.delete_item(&item.id).await.unwrap();

    let error = resolve_item("22222222-2222-7222-8222-222222222222", &service)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::ItemNotFound(_)));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "multi_thread")]
async fn add_toggle_delete_and_sync_against_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("shoplist.db");

    let added = run_add(
        &["Oat".to_string(), "milk".to_string()],
        2,
        Some(" barista "),
        &db_path,
    )
    .await
    .unwrap();
    assert_eq!(added.name, "Oat milk");
    assert_eq!(added.note.as_deref(), Some("barista"));

    let prefix = short_id(&added.id.to_string());
    let toggled = run_toggle(&prefix, &db_path).await.unwrap();
    assert!(toggled.is_bought);

    let doomed = run_add(&["Crisps".to_string()], 1, None, &db_path)
        .await
        .unwrap();
    run_delete(&doomed.id.to_string(), &db_path).await.unwrap();

    run_sync(Some(0.0), &db_path).await.unwrap();

    let service = ShoppingService::open_path(&db_path, &quiet_config())
        .await
        .unwrap();
    let stored = service.get_item(&added.id).await.unwrap().unwrap();
    assert_eq!(stored.sync_status, SyncStatus::Synced);
    assert!(stored.item.is_bought);
    assert!(service.get_item(&doomed.id).await.unwrap().is_none());
    assert_eq!(service.pending_changes().await.unwrap().total(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_rejects_out_of_range_failure_rate() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shoplist.db");

    let error = run_sync(Some(2.0), &db_path).await.unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(shoplist_core::Error::InvalidInput(_))
    ));
}
