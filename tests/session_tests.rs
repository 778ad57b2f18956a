mod common;

use common::fixtures::{
    annotation_quiz, bookmark_quiz, half_answered_quiz, partially_complete_quiz, repeat_quiz,
};
use common::{RecordingViewport, TestResult, answer_current, init_logger, page_id_at, page_ids};
use quizflow::{
    DocumentStore, PageTurn, QuizError, QuizSession, SessionConfig, XmlDocument, open_session,
};
use std::fs;

fn start(xml: &str) -> Result<QuizSession, Box<dyn std::error::Error>> {
    let doc = XmlDocument::parse(xml)?;
    let config = SessionConfig::from_document(&doc).build();
    Ok(QuizSession::start(Box::new(doc), config)?)
}

/// Answers the current question set and moves on, failing on a blocked turn.
fn answer_and_next(session: &mut QuizSession, viewport: &RecordingViewport) -> TestResult {
    answer_current(session)?;
    match session.next(viewport)? {
        PageTurn::Moved { .. } => Ok(()),
        other => Err(format!("expected to move, got {other:?}").into()),
    }
}

#[test]
fn resume_lands_on_first_incomplete_page() -> TestResult {
    init_logger();
    let session = start(&partially_complete_quiz())?;
    assert_eq!(session.current_index(), 2);
    assert!(session.is_resuming());
    assert!(!session.is_read_only());
    assert_eq!(session.progress()?.page_id, "Pt3");
    Ok(())
}

#[test]
fn repeat_inserts_page_after_original() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let mut session = start(&repeat_quiz())?;
    let before: Vec<usize> = session.navigation().iter().map(|e| e.page_index).collect();
    assert_eq!(before, vec![0, 1, 2, 3, 3]);

    answer_and_next(&mut session, &viewport)?;
    answer_and_next(&mut session, &viewport)?;
    assert_eq!(page_id_at(&session, session.current_index()), "Pt3");

    answer_current(&mut session)?;
    assert_eq!(session.repeat(&viewport)?, PageTurn::Moved { index: 3 });
    assert_eq!(
        page_ids(session.document()),
        vec!["Pt1", "Pt2", "Pt3", "Pt3-Rep1", "Pt4"]
    );
    let after: Vec<usize> = session.navigation().iter().map(|e| e.page_index).collect();
    assert_eq!(after, vec![0, 1, 2, 3, 4, 4]);

    let doc = session.document();
    let pages = doc.children(doc.root(), "Page");
    assert_eq!(doc.attribute(pages[2], "PageComplete"), Some("Y"));
    assert_eq!(doc.attribute(pages[3], "PageComplete"), Some("N"));
    assert_eq!(doc.attribute(pages[3], "Rep"), Some("1"));
    assert!(doc.descendants(pages[3], "Response").is_empty());

    // The repetition is a fresh page that needs its own answers.
    assert!(matches!(session.next(&viewport)?, PageTurn::Blocked { .. }));
    answer_and_next(&mut session, &viewport)?;
    assert_eq!(page_id_at(&session, session.current_index()), "Pt4");
    Ok(())
}

#[test]
fn bookmark_jumps_back_to_first_question_set() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let mut session = start(&bookmark_quiz())?;

    answer_and_next(&mut session, &viewport)?;
    answer_and_next(&mut session, &viewport)?;
    assert_eq!(
        session.go_to_bookmark(&viewport)?,
        PageTurn::Blocked {
            message: "This page has no bookmark to return to.".into()
        }
    );
    answer_and_next(&mut session, &viewport)?;
    assert_eq!(page_id_at(&session, session.current_index()), "Review");

    answer_current(&mut session)?;
    assert_eq!(session.go_to_bookmark(&viewport)?, PageTurn::Moved { index: 0 });
    let doc = session.document();
    let review = doc.children(doc.root(), "Page")[2];
    assert_eq!(doc.attribute(review, "PageComplete"), Some("Y"));
    Ok(())
}

#[test]
fn annotations_gate_the_last_question_set() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let mut session = start(&annotation_quiz())?;
    answer_current(&mut session)?;

    let PageTurn::Blocked { message } = session.next(&viewport)? else {
        return Err("expected the page to be blocked".into());
    };
    assert_eq!(message.lines().count(), 2);
    assert!(message.contains("markup line"));
    assert!(message.contains("segmentation"));

    let image = {
        let doc = session.document();
        let page = doc.children(doc.root(), "Page")[0];
        doc.children(page, "Image")[0]
    };
    session.record_markup_line(image, "line1.mrk.json")?;
    session.record_markup_line(image, "line2.mrk.json")?;
    session.record_label_map(image, "ct-label.nrrd")?;
    assert!(session.requirements()?.all_met());
    assert_eq!(session.next(&viewport)?, PageTurn::Moved { index: 1 });
    Ok(())
}

#[test]
fn finished_quiz_reopens_read_only() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("quiz.xml");
    fs::write(&path, repeat_quiz())?;

    let mut session = open_session(&path, |b| b.backup_on_load(false))?;
    for _ in 0..4 {
        answer_and_next(&mut session, &viewport)?;
    }
    answer_current(&mut session)?;
    assert_eq!(session.finish(&viewport)?, PageTurn::Finished);
    let doc = session.document();
    assert_eq!(doc.attribute(doc.root(), "QuizComplete"), Some("Y"));
    drop(session);

    let mut review = open_session(&path, |b| b.backup_on_load(false))?;
    assert!(review.is_read_only());
    assert!(review.resume_point().quiz_complete);
    assert_eq!(review.current_index(), 0);
    assert_eq!(review.finish(&viewport), Err(QuizError::ReadOnly));
    assert_eq!(review.next(&viewport)?, PageTurn::Moved { index: 1 });
    assert_eq!(review.exit(&viewport)?, PageTurn::Exited);
    Ok(())
}

#[test]
fn file_backed_session_saves_every_turn() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("quiz.xml");
    fs::write(&path, repeat_quiz())?;

    let mut session = open_session(&path, |b| b)?;
    let backups: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains("_backup_"))
        .collect();
    assert_eq!(backups.len(), 1);

    answer_and_next(&mut session, &viewport)?;
    session.exit(&viewport)?;
    drop(session);

    let saved = XmlDocument::open(&path, false)?;
    let root = saved.root();
    let login = saved.last_child(root, "Login").ok_or("no Login recorded")?;
    assert!(saved.attribute(login, "LogoutTime").is_some());
    let first = saved.children(root, "Page")[0];
    assert_eq!(saved.attribute(first, "PageComplete"), Some("Y"));
    assert_eq!(saved.descendants(first, "Response").len(), 1);

    let resumed = open_session(&path, |b| b.backup_on_load(false))?;
    assert_eq!(resumed.current_index(), 1);
    assert!(resumed.is_resuming());
    assert_eq!(resumed.document().children(root, "Login").len(), 2);
    Ok(())
}

#[test]
fn unanswered_previous_is_allowed_on_untouched_sets() -> TestResult {
    let viewport = RecordingViewport::default();
    let mut session = start(&repeat_quiz())?;
    answer_and_next(&mut session, &viewport)?;
    assert_eq!(session.previous(&viewport)?, PageTurn::Moved { index: 0 });
    assert_eq!(
        session.previous(&viewport)?,
        PageTurn::Blocked {
            message: "This is the first page of the quiz.".into()
        }
    );
    Ok(())
}

#[test]
fn resumed_session_may_leave_a_half_answered_set() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let mut session = start(&half_answered_quiz(true))?;
    assert_eq!(session.current_index(), 1);
    assert!(session.is_resuming());

    assert_eq!(session.previous(&viewport)?, PageTurn::Moved { index: 0 });
    Ok(())
}

#[test]
fn fresh_session_holds_a_half_answered_set() -> TestResult {
    init_logger();
    let viewport = RecordingViewport::default();
    let mut session = start(&half_answered_quiz(false))?;
    assert!(!session.is_resuming());
    answer_and_next(&mut session, &viewport)?;

    let qs = session
        .current_question_set()?
        .ok_or("no question set at the cursor")?;
    let first_option = {
        let doc = session.document();
        let question = doc.children(qs, "Question")[0];
        doc.children(question, "Option")[0]
    };
    session.record_response(first_option, "Yes")?;

    assert_eq!(
        session.previous(&viewport)?,
        PageTurn::Blocked {
            message: "Finish answering the current questions before going back.".into()
        }
    );
    assert_eq!(session.current_index(), 1);
    Ok(())
}
