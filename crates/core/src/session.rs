//! The UI-facing controller that ties the engine together.
//!
//! Every page turn follows the same order: refresh the page's requirement
//! lists, apply the completion rules, capture the viewer state of the page
//! being left, move the cursor and save. A blocked turn changes nothing.

use crate::completion::{
    CompletionTracker, PageAction, PageRequirements, mark_quiz_complete,
    question_set_partially_answered,
};
use crate::config::SessionConfig;
use crate::error::QuizError;
use crate::history::{linked_label_map_path, resolve_bookmark};
use crate::image_state::{RestorePlan, ViewMode, Viewport, capture_image_state, plan_restore};
use crate::model::{PageRecord, page_node, question_sets};
use crate::navigation::{NavigationList, normalize_pages};
use crate::randomizer::{randomize_navigation, read_persisted_order, rebuild_navigation};
use crate::repeat::create_repeated_page;
use crate::responses::{record_label_map, record_markup_line, record_response};
use crate::resume::{ResumePoint, resolve_resume_index};
use crate::validation::validate;
use log::{debug, info};
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{NavigationEntry, Progress, attr, tag, timestamp_now};

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTurn {
    Moved { index: usize },
    /// The turn was refused; the message lists what is missing.
    Blocked { message: String },
    Finished,
    Exited,
}

impl PageTurn {
    fn blocked(message: impl Into<String>) -> Self {
        PageTurn::Blocked {
            message: message.into(),
        }
    }
}

/// Where the cursor is, resolved against the document.
struct Position {
    page: NodeId,
    question_set: usize,
    last_question_set: bool,
}

#[derive(Debug)]
pub struct QuizSession {
    doc: Box<dyn DocumentStore>,
    config: SessionConfig,
    navigation: NavigationList,
    group_order: Option<Vec<u32>>,
    current: usize,
    resume: ResumePoint,
    read_only: bool,
    login: NodeId,
    login_time: String,
    completion: CompletionTracker,
    view_mode: ViewMode,
}

impl QuizSession {
    /// Opens a session on `doc`.
    ///
    /// Normalizes and validates the document, builds (and, when configured,
    /// randomizes) navigation, resolves the resume point, records a `Login`
    /// and saves. A quiz that was already finished opens read-only at index 0.
    pub fn start(mut doc: Box<dyn DocumentStore>, config: SessionConfig) -> Result<Self, QuizError> {
        normalize_pages(doc.as_mut())?;
        if config.validate_on_start {
            validate(doc.as_ref(), config.randomize_page_groups)?;
        }

        let (navigation, group_order) = if config.randomize_page_groups {
            let (list, order) = randomize_navigation(doc.as_mut(), config.seed)?;
            (list, Some(order))
        } else {
            (rebuild_navigation(doc.as_ref())?, read_persisted_order(doc.as_ref())?)
        };

        let resume = resolve_resume_index(doc.as_ref(), &navigation)?;
        let login_time = timestamp_now();
        let root = doc.root();
        let login = doc.create_element(tag::LOGIN, &[(attr::LOGIN_TIME, login_time.as_str())]);
        doc.append_element(root, login)?;
        doc.save()?;
        info!(
            "Session started on {} with {} navigation entries at index {}",
            doc.name(),
            navigation.len(),
            resume.index
        );

        Ok(Self {
            doc,
            config,
            navigation,
            group_order,
            current: resume.index,
            resume,
            read_only: resume.quiz_complete,
            login,
            login_time,
            completion: CompletionTracker::new(),
            view_mode: ViewMode::Default,
        })
    }

    pub fn document(&self) -> &dyn DocumentStore {
        self.doc.as_ref()
    }

    pub fn into_document(self) -> Box<dyn DocumentStore> {
        self.doc
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationList {
        &self.navigation
    }

    /// The page-group order in effect, if the quiz is randomized.
    pub fn group_order(&self) -> Option<&[u32]> {
        self.group_order.as_deref()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_entry(&self) -> Result<&NavigationEntry, QuizError> {
        self.navigation.entry(self.current)
    }

    pub fn current_page(&self) -> Result<NodeId, QuizError> {
        page_node(self.doc.as_ref(), self.current_entry()?.page_index)
    }

    /// The `QuestionSet` element shown at the cursor.
    pub fn current_question_set(&self) -> Result<Option<NodeId>, QuizError> {
        let entry = self.current_entry()?;
        let page = page_node(self.doc.as_ref(), entry.page_index)?;
        Ok(question_sets(self.doc.as_ref(), page)
            .get(entry.question_set_index)
            .copied())
    }

    pub fn resume_point(&self) -> ResumePoint {
        self.resume
    }

    pub fn is_resuming(&self) -> bool {
        self.resume.resuming
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn login_time(&self) -> &str {
        &self.login_time
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switches layout. The mode is reset to `Default` whenever the page changes.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn progress(&self) -> Result<Progress, QuizError> {
        let entry = self.current_entry()?;
        let record = PageRecord::read_at(self.doc.as_ref(), entry.page_index)?;
        Ok(Progress {
            index: self.current,
            total: self.navigation.len(),
            page_id: record.id.to_string(),
            question_set: entry.question_set_index,
        })
    }

    /// Current requirement lists of the page at the cursor.
    pub fn requirements(&mut self) -> Result<PageRequirements, QuizError> {
        let page = self.current_page()?;
        Ok(self
            .completion
            .update_completion_lists(self.doc.as_ref(), page)
            .clone())
    }

    pub fn record_response(&mut self, option: NodeId, value: &str) -> Result<NodeId, QuizError> {
        self.ensure_writable()?;
        record_response(self.doc.as_mut(), option, value, &self.login_time)
    }

    pub fn record_markup_line(&mut self, image: NodeId, path: &str) -> Result<NodeId, QuizError> {
        self.ensure_writable()?;
        record_markup_line(self.doc.as_mut(), image, path, &self.login_time)
    }

    pub fn record_label_map(&mut self, image: NodeId, path: &str) -> Result<NodeId, QuizError> {
        self.ensure_writable()?;
        record_label_map(self.doc.as_mut(), image, path, &self.login_time)
    }

    /// The label map an image with `DisplayLabelMapID` should show.
    pub fn linked_label_map(&self, image: NodeId) -> Result<Option<String>, QuizError> {
        linked_label_map_path(self.doc.as_ref(), &self.navigation, self.current, image)
    }

    /// Pushes the stored view state of the current entry into the viewers.
    pub fn restore_view(&self, viewport: &mut dyn Viewport) -> Result<RestorePlan, QuizError> {
        let plan = plan_restore(
            self.doc.as_ref(),
            &self.navigation,
            self.current,
            self.view_mode,
            &self.config.n_planes,
        )?;
        plan.execute(viewport);
        Ok(plan)
    }

    pub fn next(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        if self.is_at_end() {
            return Ok(PageTurn::blocked(
                "This is the last page of the quiz; use Finish.",
            ));
        }
        let target = self.current + 1;
        if self.read_only {
            return self.move_to(target);
        }
        let position = self.position()?;
        if let Some(message) = self.advance_blocker(&position) {
            return Ok(PageTurn::blocked(message));
        }
        self.turn_page(PageAction::Next, &position, viewport, target)
    }

    /// Goes back one entry. In strict mode a half-answered question set holds
    /// the user, except in a resumed session.
    pub fn previous(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        if self.current == 0 {
            return Ok(PageTurn::blocked("This is the first page of the quiz."));
        }
        let target = self.current - 1;
        if self.read_only {
            return self.move_to(target);
        }
        let position = self.position()?;
        self.completion
            .update_completion_lists(self.doc.as_ref(), position.page);
        if self.config.require_all_answers && !self.resume.resuming {
            let partial = self
                .current_question_set()?
                .is_some_and(|qs| question_set_partially_answered(self.doc.as_ref(), qs));
            if partial {
                return Ok(PageTurn::blocked(
                    "Finish answering the current questions before going back.",
                ));
            }
        }
        self.turn_page(PageAction::Previous, &position, viewport, target)
    }

    /// Completes the quiz from its last navigation entry. The session is
    /// read-only afterwards.
    pub fn finish(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        self.ensure_writable()?;
        if !self.is_at_end() {
            return Ok(PageTurn::blocked(
                "Finish is only available on the last page of the quiz.",
            ));
        }
        let position = self.position()?;
        if let Some(message) = self.advance_blocker(&position) {
            return Ok(PageTurn::blocked(message));
        }
        self.completion.update_completed_flags(
            self.doc.as_mut(),
            position.page,
            PageAction::Finish,
            position.last_question_set,
        )?;
        let last = self.navigation.last_index().unwrap_or_default();
        mark_quiz_complete(self.doc.as_mut(), PageAction::Finish, self.current, last)?;
        self.capture(&position, viewport)?;
        self.doc.save()?;
        self.read_only = true;
        info!("Quiz finished");
        Ok(PageTurn::Finished)
    }

    /// Inserts a fresh repetition of a looped page and moves to it.
    ///
    /// Only offered from the page's last question set once every requirement
    /// of the page is met, whatever the strictness setting.
    pub fn repeat(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        self.ensure_writable()?;
        let position = self.position()?;
        if !PageRecord::read(self.doc.as_ref(), position.page)?.looped {
            return Ok(PageTurn::blocked("This page cannot be repeated."));
        }
        if !position.last_question_set {
            return Ok(PageTurn::blocked(
                "Complete the remaining question sets before repeating this page.",
            ));
        }
        let requirements = self
            .completion
            .update_completion_lists(self.doc.as_ref(), position.page);
        if !requirements.all_met() {
            return Ok(PageTurn::blocked(requirements.unmet_messages().join("\n")));
        }

        self.completion.update_completed_flags(
            self.doc.as_mut(),
            position.page,
            PageAction::Repeat,
            true,
        )?;
        self.capture(&position, viewport)?;
        let outcome = create_repeated_page(self.doc.as_mut(), &self.navigation, self.current)?;
        self.navigation = outcome.navigation;
        self.current = outcome.index;
        self.view_mode = ViewMode::Default;
        Ok(PageTurn::Moved {
            index: outcome.index,
        })
    }

    /// Jumps back to the page named by the current page's `GoToBookmark`.
    pub fn go_to_bookmark(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        let Some(target) = resolve_bookmark(self.doc.as_ref(), &self.navigation, self.current)?
        else {
            return Ok(PageTurn::blocked("This page has no bookmark to return to."));
        };
        if self.read_only {
            return self.move_to(target);
        }
        let position = self.position()?;
        if let Some(message) = self.advance_blocker(&position) {
            return Ok(PageTurn::blocked(message));
        }
        self.turn_page(PageAction::GoToBookmark, &position, viewport, target)
    }

    /// Ends the session, stamping `LogoutTime` on this session's `Login`.
    pub fn exit(&mut self, viewport: &dyn Viewport) -> Result<PageTurn, QuizError> {
        if !self.read_only {
            let position = self.position()?;
            self.completion
                .update_completion_lists(self.doc.as_ref(), position.page);
            self.completion.update_completed_flags(
                self.doc.as_mut(),
                position.page,
                PageAction::Exit,
                position.last_question_set,
            )?;
            self.capture(&position, viewport)?;
        }
        let logout = timestamp_now();
        self.doc
            .update_attributes(self.login, &[(attr::LOGOUT_TIME, logout.as_str())])?;
        self.doc.save()?;
        info!("Session exited at navigation index {}", self.current);
        Ok(PageTurn::Exited)
    }

    fn ensure_writable(&self) -> Result<(), QuizError> {
        if self.read_only {
            Err(QuizError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn is_at_end(&self) -> bool {
        self.navigation
            .last_index()
            .is_none_or(|last| self.current >= last)
    }

    fn position(&self) -> Result<Position, QuizError> {
        let entry = self.current_entry()?;
        Ok(Position {
            page: page_node(self.doc.as_ref(), entry.page_index)?,
            question_set: entry.question_set_index,
            last_question_set: self.navigation.is_last_question_set(self.current),
        })
    }

    /// Why an advance from `position` must be refused, if it must.
    fn advance_blocker(&mut self, position: &Position) -> Option<String> {
        let requirements = self
            .completion
            .update_completion_lists(self.doc.as_ref(), position.page);
        if !self.config.require_all_answers {
            return None;
        }
        if !requirements.question_set_answered(position.question_set) {
            return Some("All questions must be answered before continuing.".to_string());
        }
        if position.last_question_set && !requirements.all_met() {
            return Some(requirements.unmet_messages().join("\n"));
        }
        None
    }

    fn capture(&mut self, position: &Position, viewport: &dyn Viewport) -> Result<usize, QuizError> {
        capture_image_state(
            self.doc.as_mut(),
            position.page,
            self.view_mode,
            &self.config.n_planes,
            viewport,
            &self.login_time,
        )
    }

    fn turn_page(
        &mut self,
        action: PageAction,
        position: &Position,
        viewport: &dyn Viewport,
        target: usize,
    ) -> Result<PageTurn, QuizError> {
        let status = self.completion.update_completed_flags(
            self.doc.as_mut(),
            position.page,
            action,
            position.last_question_set,
        )?;
        debug!("{action:?} from index {}: {status:?}", self.current);
        self.capture(position, viewport)?;
        self.move_to(target)?;
        self.doc.save()?;
        Ok(PageTurn::Moved { index: target })
    }

    fn move_to(&mut self, target: usize) -> Result<PageTurn, QuizError> {
        let from = self.current_entry()?.page_index;
        let to = self.navigation.entry(target)?.page_index;
        if from != to {
            self.view_mode = ViewMode::Default;
        }
        self.current = target;
        Ok(PageTurn::Moved { index: target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizflow_traits::ElementTree;
    use quizflow_types::{Destination, ViewportSnapshot};

    struct Blank;

    impl Viewport for Blank {
        fn snapshot(&self, _: &Destination) -> Option<ViewportSnapshot> {
            None
        }
        fn fit_to_background(&mut self, _: &Destination) {}
        fn apply(&mut self, _: &Destination, _: &crate::image_state::ViewRestore) {}
    }

    /// Three one-question pages; `Pt2` is looped.
    fn quiz() -> ElementTree {
        let mut tree = ElementTree::new("Session");
        let root = tree.root();
        for id in ["Pt1", "Pt2", "Pt3"] {
            let mut attrs = vec![("ID", id)];
            if id == "Pt2" {
                attrs.push(("Loop", "Y"));
            }
            let page = tree.add_child(root, "Page", &attrs).unwrap();
            let qs = tree.add_child(page, "QuestionSet", &[]).unwrap();
            let q = tree.add_child(qs, "Question", &[]).unwrap();
            tree.add_child(q, "Option", &[("Value", "Yes")]).unwrap();
        }
        tree
    }

    fn answer_current(session: &mut QuizSession) {
        let qs = session.current_question_set().unwrap().unwrap();
        let doc = session.document();
        let q = doc.children(qs, "Question")[0];
        let option = doc.children(q, "Option")[0];
        session.record_response(option, "Yes").unwrap();
    }

    #[test]
    fn test_start_records_login() {
        let _ = env_logger::builder().is_test(true).try_init();
        let session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        let doc = session.document();
        let logins = doc.children(doc.root(), "Login");
        assert_eq!(logins.len(), 1);
        assert!(doc.attribute(logins[0], "LoginTime").is_some());
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_resuming());
    }

    #[test]
    fn test_unanswered_next_is_blocked_without_changes() {
        let mut session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        let turn = session.next(&Blank).unwrap();
        assert!(matches!(turn, PageTurn::Blocked { .. }));
        assert_eq!(session.current_index(), 0);
        let page = session.current_page().unwrap();
        assert_eq!(session.document().attribute(page, "PageComplete"), None);
    }

    #[test]
    fn test_lenient_mode_never_blocks() {
        let config = SessionConfig::builder().require_all_answers(false).build();
        let mut session = QuizSession::start(Box::new(quiz()), config).unwrap();
        assert_eq!(session.next(&Blank).unwrap(), PageTurn::Moved { index: 1 });
        // Moving on without answers does not complete the page.
        let first = page_node(session.document(), 0).unwrap();
        assert_eq!(session.document().attribute(first, "PageComplete"), None);
    }

    #[test]
    fn test_answered_next_completes_page() {
        let mut session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        answer_current(&mut session);
        assert_eq!(session.next(&Blank).unwrap(), PageTurn::Moved { index: 1 });
        let first = page_node(session.document(), 0).unwrap();
        assert_eq!(session.document().attribute(first, "PageComplete"), Some("Y"));
        assert_eq!(session.progress().unwrap().page_id, "Pt2");
    }

    #[test]
    fn test_repeat_needs_loop_and_answers() {
        let mut session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        answer_current(&mut session);
        assert!(matches!(session.repeat(&Blank).unwrap(), PageTurn::Blocked { .. }));
        session.next(&Blank).unwrap();
        assert!(matches!(session.repeat(&Blank).unwrap(), PageTurn::Blocked { .. }));

        answer_current(&mut session);
        assert_eq!(session.repeat(&Blank).unwrap(), PageTurn::Moved { index: 2 });
        assert_eq!(session.progress().unwrap().page_id, "Pt2-Rep1");
        assert_eq!(session.navigation().len(), 4);
    }

    #[test]
    fn test_finish_then_read_only() {
        let mut session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        assert!(matches!(session.finish(&Blank).unwrap(), PageTurn::Blocked { .. }));
        for _ in 0..2 {
            answer_current(&mut session);
            session.next(&Blank).unwrap();
        }
        answer_current(&mut session);
        assert_eq!(session.finish(&Blank).unwrap(), PageTurn::Finished);
        let doc = session.document();
        assert_eq!(doc.attribute(doc.root(), "QuizComplete"), Some("Y"));

        assert!(session.is_read_only());
        let option = doc.descendants(doc.root(), "Option")[0];
        assert_eq!(session.record_response(option, "No"), Err(QuizError::ReadOnly));
        // Review still navigates.
        assert_eq!(session.previous(&Blank).unwrap(), PageTurn::Moved { index: 1 });
    }

    #[test]
    fn test_exit_stamps_logout() {
        let mut session = QuizSession::start(Box::new(quiz()), SessionConfig::default()).unwrap();
        assert_eq!(session.exit(&Blank).unwrap(), PageTurn::Exited);
        let doc = session.document();
        let login = doc.last_child(doc.root(), "Login").unwrap();
        assert!(doc.attribute(login, "LogoutTime").is_some());
    }

    #[test]
    fn test_partial_answers_hold_previous() {
        let mut tree = quiz();
        let root = tree.root();
        let page = tree.children(root, "Page")[1];
        let qs = tree.children(page, "QuestionSet")[0];
        let q = tree.add_child(qs, "Question", &[]).unwrap();
        tree.add_child(q, "Option", &[]).unwrap();

        let config = SessionConfig::default();
        let mut session = QuizSession::start(Box::new(tree), config).unwrap();
        answer_current(&mut session);
        session.next(&Blank).unwrap();
        answer_current(&mut session);
        assert!(matches!(session.previous(&Blank).unwrap(), PageTurn::Blocked { .. }));
    }
}
