use bitacora_core::config::{Environment, ENV_MEDIA_DIR, ENV_UTC_OFFSET};
use bitacora_core::models::NoteEdit;
use bitacora_core::{MedicalArea, Note};
use chrono::{Offset, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cli::{Cli, Commands, CompletionShell, ExportFormat, FieldArgs, ReportFormat};
use crate::commands::attach::run_attach;
use crate::commands::common::{
    default_editor, field_edits, format_note_lines, format_relative_time, normalize_content,
    normalize_note_identifier, normalize_search_query, open_database, parse_note_date,
    resolve_note_for_edit, title_preview, Session,
};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::new::run_new;
use crate::commands::report::run_report;
use crate::commands::sync::run_sync;
use crate::error::CliError;

fn test_session(user: &str) -> (TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(&dir, user, &[]);
    (dir, session)
}

fn session_in(dir: &TempDir, user: &str, extra: &[(&str, &str)]) -> Session {
    let media_dir = dir.path().join("media").display().to_string();
    let env = Environment::from_pairs(
        std::iter::once((ENV_MEDIA_DIR.to_string(), media_dir)).chain(
            extra
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
        ),
    );
    Session::from_environment(
        env,
        Some(dir.path().join("bitacora.db")),
        Some(user.to_string()),
    )
    .unwrap()
}

fn fixed_note(id: &str, title: &str) -> Note {
    Note {
        id: id.parse().unwrap(),
        title: title.to_string(),
        ..Note::new()
    }
}

async fn seed(session: &Session, notes: &[Note]) {
    let db = open_database(session).await.unwrap();
    for note in notes {
        db.create_note(note).await.unwrap();
    }
}

fn march_fifth_utc() -> i64 {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  ana  "), Some("ana".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn title_preview_truncates_and_names_untitled_notes() {
    let note = Note::with_title("Control cardiológico anual con electrocardiograma");
    assert_eq!(title_preview(&note, 20), "Control cardiológ...");
    assert_eq!(title_preview(&Note::new(), 20), "(sin título)");
}

#[test]
fn format_note_lines_show_area_when_set() {
    let mut note = Note::with_title("Visita");
    note.area = Some(MedicalArea::Cardiology);
    let lines = format_note_lines(&[note.clone(), Note::with_title("Sin área")]);

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&note.id.to_string()[..13]));
    assert!(lines[0].ends_with("Cardiología"));
    assert!(!lines[1].contains("Cardiología"));
}

#[test]
fn normalize_search_query_rejects_empty() {
    assert!(matches!(
        normalize_search_query("   "),
        Err(CliError::EmptySearchQuery)
    ));
    assert_eq!(normalize_search_query(" visi ").unwrap(), "visi");
}

#[test]
fn normalize_note_identifier_rejects_empty() {
    assert!(matches!(
        normalize_note_identifier(" "),
        Err(CliError::EmptyNoteId)
    ));
    assert_eq!(normalize_note_identifier("  abc123  ").unwrap(), "abc123");
}

#[test]
fn parse_note_date_uses_session_offset() {
    let buenos_aires = bitacora_core::config::parse_utc_offset("-03:00").unwrap();
    let expected = Utc
        .with_ymd_and_hms(2024, 3, 5, 17, 30, 0)
        .unwrap()
        .timestamp_millis();

    assert_eq!(
        parse_note_date("2024-03-05 14:30", &buenos_aires).unwrap(),
        expected
    );
    assert_eq!(
        parse_note_date("2024-03-05T17:30:00Z", &buenos_aires).unwrap(),
        expected
    );
    assert_eq!(
        parse_note_date("2024-03-05", &buenos_aires).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 5, 3, 0, 0)
            .unwrap()
            .timestamp_millis()
    );
    assert!(matches!(
        parse_note_date("05/03/2024", &buenos_aires),
        Err(CliError::InvalidDate(_))
    ));
}

#[test]
fn field_edits_follow_form_order() {
    let fields = FieldArgs {
        body: Some("Sin novedades".to_string()),
        area: Some("cardiologia".to_string()),
        title: Some("Visita".to_string()),
        ..FieldArgs::default()
    };
    let edits = field_edits(&fields, &Utc.fix()).unwrap();

    assert_eq!(
        edits,
        vec![
            NoteEdit::Title("Visita".to_string()),
            NoteEdit::Area(Some(MedicalArea::Cardiology)),
            NoteEdit::Body("Sin novedades".to_string()),
        ]
    );
}

#[test]
fn field_edits_clear_area_and_reject_unknown_area() {
    let clear = FieldArgs {
        clear_area: true,
        ..FieldArgs::default()
    };
    assert_eq!(
        field_edits(&clear, &Utc.fix()).unwrap(),
        vec![NoteEdit::Area(None)]
    );
    assert!(FieldArgs::default().is_empty());
    assert!(!clear.is_empty());

    let unknown = FieldArgs {
        area: Some("Oftalmología".to_string()),
        ..FieldArgs::default()
    };
    assert!(matches!(
        field_edits(&unknown, &Utc.fix()),
        Err(CliError::Core(bitacora_core::Error::InvalidInput(_)))
    ));
}

#[test]
fn session_flags_override_environment() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(&dir, "  ", &[(ENV_UTC_OFFSET, "-03:00")]);

    assert_eq!(session.config.user, "local");
    assert_eq!(session.config.db_path, dir.path().join("bitacora.db"));
    assert_eq!(session.offset().local_minus_utc(), -3 * 3600);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn resolve_note_for_edit_supports_exact_and_prefix_id() {
    let (_dir, session) = test_session("ana");
    let note_a = fixed_note("11111111-1111-7111-8111-111111111111", "Nota A");
    let note_b = fixed_note("11111111-1111-7111-8111-222222222222", "Nota B");
    seed(&session, &[note_a, note_b]).await;

    let db = open_database(&session).await.unwrap();
    let by_exact = resolve_note_for_edit("11111111-1111-7111-8111-111111111111", &db)
        .await
        .unwrap();
    assert_eq!(by_exact.title, "Nota A");

    let by_prefix = resolve_note_for_edit("11111111-1111-7111-8111-2", &db)
        .await
        .unwrap();
    assert_eq!(by_prefix.title, "Nota B");

    let ambiguous = resolve_note_for_edit("11111111-1111-7111-8111", &db)
        .await
        .unwrap_err();
    assert!(matches!(ambiguous, CliError::AmbiguousNoteId(_)));

    let missing = resolve_note_for_edit("does-not-exist", &db)
        .await
        .unwrap_err();
    assert!(matches!(missing, CliError::NoteNotFound(_)));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn notes_of_other_users_are_not_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let ana = session_in(&dir, "ana", &[]);
    let luis = session_in(&dir, "luis", &[]);
    seed(
        &ana,
        &[fixed_note("22222222-2222-7222-8222-222222222222", "Privada")],
    )
    .await;

    let db = open_database(&luis).await.unwrap();
    let error = resolve_note_for_edit("22222222", &db).await.unwrap_err();
    assert!(matches!(error, CliError::NoteNotFound(_)));
    assert!(db.list_notes().await.unwrap().is_empty());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_new_persists_field_flags() {
    let (_dir, session) = test_session("ana");
    let fields = FieldArgs {
        title: Some("Visita".to_string()),
        date: Some("2024-03-05 14:30".to_string()),
        area: Some("Cardiología".to_string()),
        dni: Some("30123456".to_string()),
        ..FieldArgs::default()
    };

    run_new(&fields, &session).await.unwrap();

    let notes = open_database(&session)
        .await
        .unwrap()
        .list_notes()
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    let note = &notes[0];
    assert_eq!(note.title, "Visita");
    assert_eq!(note.date, march_fifth_utc());
    assert_eq!(note.area, Some(MedicalArea::Cardiology));
    assert_eq!(note.dni, "30123456");
    assert_eq!(note.body, "");
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_delete_removes_note_by_exact_and_prefix_id() {
    let (_dir, session) = test_session("ana");
    let keep = fixed_note("bbbbbbbb-bbbb-7bbb-8bbb-111111111111", "Conservar");
    let gone = fixed_note("bbbbbbbb-bbbb-7bbb-8bbb-222222222222", "Borrar");
    seed(&session, &[keep.clone(), gone.clone()]).await;

    run_delete("bbbbbbbb-bbbb-7bbb-8bbb-2", &session)
        .await
        .unwrap();

    let db = open_database(&session).await.unwrap();
    assert!(db.get_note(&gone.id).await.unwrap().is_none());
    assert!(db.get_note(&keep.id).await.unwrap().is_some());
    drop(db);

    run_delete("bbbbbbbb-bbbb-7bbb-8bbb-111111111111", &session)
        .await
        .unwrap();

    let db = open_database(&session).await.unwrap();
    assert!(db.get_note(&keep.id).await.unwrap().is_none());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_attach_uploads_to_media_dir_and_saves_urls() {
    let (dir, session) = test_session("ana");
    let note = fixed_note("cccccccc-cccc-7ccc-8ccc-111111111111", "Radiografía");
    seed(&session, &[note.clone()]).await;

    let image = dir.path().join("Tórax.PNG");
    std::fs::write(&image, b"png-bytes").unwrap();

    run_attach("cccccccc", &[image], &session).await.unwrap();

    let stored = open_database(&session)
        .await
        .unwrap()
        .get_note(&note.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.image_urls.len(), 1);
    let url = &stored.image_urls[0];
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("-t-rax.png"));
    let written = std::fs::read(url.trim_start_matches("file://")).unwrap();
    assert_eq!(written, b"png-bytes");
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_attach_with_no_files_changes_nothing() {
    let (dir, session) = test_session("ana");
    let note = fixed_note("dddddddd-dddd-7ddd-8ddd-111111111111", "Sin adjuntos");
    seed(&session, &[note.clone()]).await;

    run_attach("dddddddd", &[], &session).await.unwrap();

    let stored = open_database(&session)
        .await
        .unwrap()
        .get_note(&note.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, note);
    assert!(!dir.path().join("media").exists());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_report_writes_pdf_and_text() {
    let (dir, session) = test_session("ana");
    let note = Note {
        date: march_fifth_utc(),
        dni: "30123456".to_string(),
        area: Some(MedicalArea::Neurology),
        ..fixed_note("eeeeeeee-eeee-7eee-8eee-111111111111", "Visita")
    };
    seed(&session, &[note]).await;

    let pdf_path = dir.path().join("reporte.pdf");
    run_report("eeeeeeee", ReportFormat::Pdf, Some(&pdf_path), &session)
        .await
        .unwrap();
    let pdf = std::fs::read(&pdf_path).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let text_path = dir.path().join("reporte.txt");
    run_report("eeeeeeee", ReportFormat::Text, Some(&text_path), &session)
        .await
        .unwrap();
    let text = std::fs::read_to_string(&text_path).unwrap();
    assert_eq!(
        text,
        "Asunto: Visita\n\
         Fecha: 05 de marzo de 2024 - 14:30\n\
         DNI: 30123456\n\
         Área: Neurología\n\
         Detalles: \n"
    );
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_export_writes_json_file() {
    let (dir, session) = test_session("ana");
    seed(
        &session,
        &[fixed_note("ffffffff-ffff-7fff-8fff-111111111111", "Exportar")],
    )
    .await;

    let output_path = dir.path().join("export.json");
    run_export(ExportFormat::Json, Some(&output_path), &session)
        .await
        .unwrap();

    let exported = std::fs::read_to_string(&output_path).unwrap();
    assert!(exported.contains("\"title\": \"Exportar\""));
    assert!(exported.contains("\"area\": null"));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_export_into_directory_uses_suggested_file_name() {
    let (dir, session) = test_session("ana");
    seed(
        &session,
        &[fixed_note("ffffffff-ffff-7fff-8fff-222222222222", "Guardia")],
    )
    .await;

    let exports_dir = dir.path().join("exports");
    std::fs::create_dir(&exports_dir).unwrap();
    run_export(ExportFormat::Markdown, Some(&exports_dir), &session)
        .await
        .unwrap();

    let written = std::fs::read_dir(&exports_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    assert_eq!(written.len(), 1);
    let file_name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("bitacora-export-"));
    assert!(file_name.ends_with(".md"));
    assert!(std::fs::read_to_string(&written[0])
        .unwrap()
        .contains("# Guardia"));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn run_sync_requires_sync_configuration() {
    let (_dir, session) = test_session("ana");

    let error = run_sync(&session).await.unwrap_err();
    assert!(matches!(error, CliError::SyncNotConfigured));
}

#[test]
fn global_flags_parse_alongside_session_free_commands() {
    use clap::Parser;

    let cli = Cli::try_parse_from(["bitacora", "--user", "ana", "areas"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Areas)));
    assert_eq!(cli.user.as_deref(), Some("ana"));

    let cli = Cli::try_parse_from(["bitacora", "completions", "zsh", "--db-path", "j.db"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Completions {
            shell: CompletionShell::Zsh,
            output: None
        })
    ));
    assert_eq!(cli.db_path, Some(std::path::PathBuf::from("j.db")));
}

#[test]
fn run_completions_writes_bash_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("bitacora.bash");

    run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

    let script = std::fs::read_to_string(&output_path).unwrap();
    assert!(script.contains("_bitacora()"));
    assert!(script.contains("complete -F _bitacora"));
}
