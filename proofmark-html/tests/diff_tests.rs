use indoc::indoc;
use proofmark::{DiffSettings, LayoutChangeType, ModificationType};
use proofmark_html::{diff_html, diff_html3, diff_html_with, diff_markup};
use proofmark_testhelpers::test;

#[test]
fn inserted_word_is_wrapped_in_ins() {
    let markup = diff_html("<p>This is a blue book</p>", "<p>This is a big blue book</p>").unwrap();
    insta::assert_snapshot!(markup, @r#"<p>This is a <ins class="diff-html-added" id="added-diff-0" previous="first-diff" changeId="added-diff-0" next="last-diff">big </ins>blue book</p>"#);
}

#[test]
fn removed_word_is_copied_back_in_del() {
    let markup = diff_html("<p>This is a big blue book</p>", "<p>This is a blue book</p>").unwrap();
    assert!(markup.starts_with("<p>This is a <del class=\"diff-html-removed\""));
    assert!(markup.contains("id=\"removed-diff-0\""));
    assert!(markup.contains(">big </del>blue book</p>"));
}

#[test]
fn removed_adjective_is_shown_in_place() {
    let markup = diff_html("<p>This is a blue book</p>", "<p>This is a book</p>").unwrap();
    insta::assert_snapshot!(markup, @r#"<p>This is a <del class="diff-html-removed" id="removed-diff-0" previous="first-diff" changeId="removed-diff-0" next="last-diff">blue </del>book</p>"#);
}

#[test]
fn identical_documents_are_unchanged() {
    let html = indoc! {r#"
        <html><head><title>Doc</title></head><body>
        <h1>Title</h1>
        <p>Some <a href="x.html">linked</a> text.</p>
        </body></html>
    "#};
    let document = diff_html_with(html, html, &DiffSettings::default()).unwrap();
    assert!(document.differences().is_empty());
    assert!(document.history().is_empty());
    let markup = document.to_markup().unwrap();
    assert!(!markup.contains("diff-html"));
    assert!(markup.contains("<a href=\"x.html\">linked</a>"));
}

#[test]
fn added_style_is_a_change_with_a_narrative() {
    let document = diff_html_with(
        "<p>same words</p>",
        "<p><b>same words</b></p>",
        &DiffSettings::default(),
    )
    .unwrap();
    assert_eq!(document.summaries(), ["Bold style added."]);
    let layout = document.layout_changes();
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].change_type, LayoutChangeType::TagAdded);
    assert_eq!(layout[0].opening_tag, "<b>");

    let markup = document.to_markup().unwrap();
    assert!(markup.contains("<span class=\"diff-html-changed\" id=\"changed-diff-0\""));
    assert!(markup.contains("title=\"Bold style added.\""));
}

#[test]
fn every_run_is_linked_to_its_neighbors() {
    let document = diff_html_with(
        "<p>one two three four five</p>",
        "<p>one 2 three 4 five</p>",
        &DiffSettings::default(),
    )
    .unwrap();
    let history = document.history();
    assert!(history.len() >= 2);
    for link in history {
        let run = document.run(*link);
        assert!(!run.is_empty());
        let head = document.tree().node(run[0]).modification.as_ref().unwrap();
        assert!(head.first_of_id);
        assert_ne!(head.output, ModificationType::None);
    }
    let markup = document.to_markup().unwrap();
    assert!(markup.contains("previous=\"first-diff\""));
    assert!(markup.contains("next=\"last-diff\""));
}

#[test]
fn lenient_input_still_diffs() {
    let markup = diff_html(
        "<P>unclosed <b>bold</P><p>stray</span> stop",
        "<P>unclosed <b>bold</P><p>stray</span> finale",
    )
    .unwrap();
    assert!(markup.contains("<b>bold</b>"));
    assert!(markup.contains("<ins class=\"diff-html-added\""));
    assert!(markup.contains("<del class=\"diff-html-removed\""));
}

#[test]
fn three_way_shows_right_changes() {
    let markup = diff_html3(
        "<p>one two three</p>",
        "<p>one two three</p>",
        "<p>one two three four</p>",
    )
    .unwrap();
    assert!(markup.contains("<ins class=\"diff-html-added\""));
    assert!(markup.contains(">four</ins>"));
}

#[test]
fn three_way_marks_conflicts() {
    let markup = diff_html3(
        "<p>one two three</p>",
        "<p>one deux three</p>",
        "<p>one zwei three</p>",
    )
    .unwrap();
    assert!(markup.contains("diff-html-conflict"));
}

#[test]
fn markup_diff_highlights_tokens() {
    let markup = diff_markup("<p>This is a blue book</p>", "<p>This is a big blue book</p>").unwrap();
    insta::assert_snapshot!(markup, @r##"&lt;p&gt;This is a <span class="diff-tag-added" id="added1" title="#added1">big </span>blue book&lt;/p&gt;"##);
}
