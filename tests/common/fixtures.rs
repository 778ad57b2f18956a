//! Quiz documents used across the integration tests.

/// A page with `sets` question sets of one single-choice question each.
fn page(id: &str, attrs: &str, sets: usize, extra: &str) -> String {
    let sets: String = (0..sets)
        .map(|_| {
            "<QuestionSet><Question Type=\"Radio\"><Option Value=\"Yes\"/><Option Value=\"No\"/></Question></QuestionSet>"
                .to_string()
        })
        .collect();
    format!("<Page ID=\"{id}\" {attrs}>{extra}{sets}</Page>")
}

fn session(attrs: &str, pages: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Session {attrs}>{}</Session>",
        pages.concat()
    )
}

/// Four pages whose `PageComplete` flags are `[Y, Y, N, Y]`.
pub fn partially_complete_quiz() -> String {
    let pages: Vec<String> = [("Pt1", "Y"), ("Pt2", "Y"), ("Pt3", "N"), ("Pt4", "Y")]
        .iter()
        .map(|(id, done)| page(id, &format!("PageComplete=\"{done}\""), 1, ""))
        .collect();
    session("", &pages)
}

/// `Pt1`, `Pt2`, `Pt3` (looped) with one question set each, `Pt4` with two.
pub fn repeat_quiz() -> String {
    session(
        "",
        &[
            page("Pt1", "Rep=\"0\"", 1, ""),
            page("Pt2", "Rep=\"0\"", 1, ""),
            page("Pt3", "Rep=\"0\" Loop=\"Y\"", 1, ""),
            page("Pt4", "Rep=\"0\"", 2, ""),
        ],
    )
}

/// An intro page in group 0 followed by one page in each of groups 1 to 9.
pub fn grouped_quiz() -> String {
    let mut pages = vec![page("Intro", "PageGroup=\"0\"", 1, "")];
    pages.extend((1..=9).map(|g| page(&format!("G{g}"), &format!("PageGroup=\"{g}\""), 1, "")));
    session("RandomizePageGroups=\"Y\"", &pages)
}

/// Two pages showing the same CT volume in the red viewer, axial.
pub fn image_quiz() -> String {
    let image = |offset: &str| {
        format!(
            "<Image ID=\"ct\" Type=\"Volume\"><Path>ct.nrrd</Path><Layer>Background</Layer>\
             <Destination>Red</Destination><Orientation>Axial</Orientation>{offset}</Image>\
             <Image ID=\"seg\" Type=\"LabelMap\"><Path>seg.nrrd</Path><Layer>Label</Layer>\
             <Destination>Red</Destination><Orientation>Axial</Orientation></Image>"
        )
    };
    session(
        "",
        &[
            page(
                "Pt1",
                "",
                1,
                &image("<DefaultSliceOffset>12.5</DefaultSliceOffset>"),
            ),
            page("Pt2", "", 1, &image("")),
        ],
    )
}

/// A bookmark loop: `Start` is bookmarked, `Review` jumps back to it.
pub fn bookmark_quiz() -> String {
    session(
        "",
        &[
            page("Start", "BookmarkID=\"Start\"", 2, ""),
            page("Middle", "", 1, ""),
            page("Review", "GoToBookmark=\"Start\"", 1, ""),
            page("End", "", 1, ""),
        ],
    )
}

/// A page that needs two markup lines and a segmentation besides its answers.
pub fn annotation_quiz() -> String {
    let image = "<Image ID=\"ct\" MinMarkupLines=\"2\"><Path>ct.nrrd</Path><Layer>Background</Layer>\
                 <Destination>Red</Destination><Orientation>Axial</Orientation></Image>";
    session(
        "",
        &[
            page("Draw", "SegmentRequired=\"Y\"", 1, image),
            page("Done", "", 1, ""),
        ],
    )
}

/// `Pt1` with one question, `Pt2` with one set of two questions.
///
/// With `answered` set, `Pt1` is complete and only the first question of `Pt2`
/// has a response, as left behind by an earlier session.
pub fn half_answered_quiz(answered: bool) -> String {
    let response = if answered {
        "<Response LoginTime=\"20260101_09:00:00\" ResponseTime=\"20260101_09:01:00\">Yes</Response>"
    } else {
        ""
    };
    let question = |answer: &str| {
        format!("<Question Type=\"Radio\"><Option Value=\"Yes\">{answer}</Option><Option Value=\"No\"/></Question>")
    };
    let complete = if answered { " PageComplete=\"Y\"" } else { "" };
    session(
        "",
        &[
            format!(
                "<Page ID=\"Pt1\" Rep=\"0\"{complete}><QuestionSet>{}</QuestionSet></Page>",
                question(response)
            ),
            format!(
                "<Page ID=\"Pt2\" Rep=\"0\"><QuestionSet>{}{}</QuestionSet></Page>",
                question(response),
                question("")
            ),
        ],
    )
}
