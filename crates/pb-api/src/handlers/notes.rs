use actix_web::web;
use pb_core::access::{require_login, Operation, Verb};
use pb_core::notes::NoteInput;
use pb_core::AppError;
use pb_ui::{
    FormErrors, NoteDeleteTemplate, NoteDetailTemplate, NoteDoneTemplate, NoteForm,
    NoteFormTemplate, NotesHomeTemplate, NotesListTemplate,
};

use super::render;
use crate::error::{redirect, PageResult};
use crate::viewer::{ForViewer, Viewer};
use crate::AppState;

const NOTES_PATH: &str = "/notes/";
const DONE_PATH: &str = "/notes/done/";
const ADD_PATH: &str = "/notes/add/";

fn note_form(input: NoteInput, errors: &[pb_core::FieldError]) -> NoteForm {
    NoteForm {
        title: input.title,
        text: input.text,
        slug: input.slug,
        errors: FormErrors::new(errors),
    }
}

/// GET /
pub async fn home(viewer: Viewer) -> PageResult {
    render(&NotesHomeTemplate {
        current_user: viewer.username(),
    })
}

/// GET /notes/
pub async fn list(state: web::Data<AppState>, viewer: Viewer) -> PageResult {
    let notes = state.notes.list(&viewer.identity).await.for_viewer(&viewer)?;
    render(&NotesListTemplate {
        current_user: viewer.username(),
        notes: &notes,
    })
}

/// GET /notes/done/
pub async fn done(viewer: Viewer) -> PageResult {
    require_login(&viewer.identity).for_viewer(&viewer)?;
    render(&NoteDoneTemplate {
        current_user: viewer.username(),
    })
}

/// GET /notes/add/
pub async fn add_page(viewer: Viewer) -> PageResult {
    require_login(&viewer.identity).for_viewer(&viewer)?;
    render(&NoteFormTemplate {
        current_user: viewer.username(),
        action: ADD_PATH,
        heading: "Add note",
        form: NoteForm::default(),
    })
}

/// POST /notes/add/
///
/// An unreadable body is treated as an empty form after the login check.
pub async fn add(
    state: web::Data<AppState>,
    viewer: Viewer,
    form: Option<web::Form<NoteInput>>,
) -> PageResult {
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    let result = state.notes.create(&viewer.identity, &input).await;
    match result {
        Ok(_) => Ok(redirect(NOTES_PATH)),
        Err(AppError::Validation(errors)) => render(&NoteFormTemplate {
            current_user: viewer.username(),
            action: ADD_PATH,
            heading: "Add note",
            form: note_form(input, &errors),
        }),
        Err(e) => Err(viewer.fail(e)),
    }
}

/// GET /notes/{slug}/
pub async fn detail(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> PageResult {
    let note = state
        .notes
        .note_for(&viewer.identity, &path, Operation::ViewDetail, Verb::Read)
        .await
        .for_viewer(&viewer)?;
    render(&NoteDetailTemplate {
        current_user: viewer.username(),
        note: &note,
    })
}

/// GET /notes/{slug}/edit/
pub async fn edit_page(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> PageResult {
    let note = state
        .notes
        .note_for(&viewer.identity, &path, Operation::Edit, Verb::Read)
        .await
        .for_viewer(&viewer)?;
    let action = format!("/notes/{}/edit/", note.slug);
    render(&NoteFormTemplate {
        current_user: viewer.username(),
        action: &action,
        heading: "Edit note",
        form: note_form(NoteInput::from(&note), &[]),
    })
}

/// POST /notes/{slug}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    form: Option<web::Form<NoteInput>>,
) -> PageResult {
    let slug = path.into_inner();
    let input = form.map(web::Form::into_inner).unwrap_or_default();
    let result = state.notes.update(&viewer.identity, &slug, &input).await;
    match result {
        Ok(_) => Ok(redirect(DONE_PATH)),
        Err(AppError::Validation(errors)) => {
            // Posts back to the slug in the URL; the new one is not saved yet.
            let action = format!("/notes/{slug}/edit/");
            render(&NoteFormTemplate {
                current_user: viewer.username(),
                action: &action,
                heading: "Edit note",
                form: note_form(input, &errors),
            })
        }
        Err(e) => Err(viewer.fail(e)),
    }
}

/// GET /notes/{slug}/delete/
pub async fn delete_page(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> PageResult {
    let note = state
        .notes
        .note_for(&viewer.identity, &path, Operation::Delete, Verb::Read)
        .await
        .for_viewer(&viewer)?;
    render(&NoteDeleteTemplate {
        current_user: viewer.username(),
        note: &note,
    })
}

/// POST /notes/{slug}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> PageResult {
    state
        .notes
        .delete(&viewer.identity, &path)
        .await
        .for_viewer(&viewer)?;
    Ok(redirect(DONE_PATH))
}
