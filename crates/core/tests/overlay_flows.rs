use scoremark_core::{
    DocumentHandle, FixedRenderer, InteractionMode, MarkerAction, MarkerPhase, MarkupStore,
    MarkupUpdate, OverlayEngine, PointerTarget, SurfaceBounds, SurfacePoint, UpdateReason,
};

fn renderer(pages: u32) -> FixedRenderer {
    FixedRenderer::new(pages, SurfaceBounds::new(0.0, 0.0, 612.0, 792.0))
}

fn engine(pages: u32) -> (OverlayEngine, FixedRenderer) {
    let mut renderer = renderer(pages);
    let mut engine = OverlayEngine::default();
    engine.load_with(&mut renderer, DocumentHandle::new(1)).expect("document should load");
    (engine, renderer)
}

fn pt(x: f32, y: f32) -> SurfacePoint {
    SurfacePoint::new(x, y)
}

fn drag(engine: &mut OverlayEngine, from: (f32, f32), to: (f32, f32)) -> Option<MarkupUpdate> {
    engine.pointer_down(pt(from.0, from.1), PointerTarget::Surface);
    engine.pointer_move(pt(to.0, to.1));
    engine.pointer_up(pt(to.0, to.1))
}

fn turn_to(engine: &mut OverlayEngine, renderer: &mut FixedRenderer, page: u32) {
    engine.set_page(page);
    engine.render_with(renderer).expect("page should render");
}

#[test]
fn sub_threshold_drags_add_nothing() {
    let (mut engine, _) = engine(1);

    assert!(drag(&mut engine, (10.0, 10.0), (14.0, 90.0)).is_none());
    assert!(drag(&mut engine, (10.0, 10.0), (90.0, 15.0)).is_none());
    assert!(drag(&mut engine, (10.0, 10.0), (15.0, 15.0)).is_none());

    assert!(engine.markup().is_empty());
    assert!(!engine.can_undo());
}

#[test]
fn reverse_drag_commits_normalized_rect() {
    let (mut engine, _) = engine(1);
    let update = drag(&mut engine, (100.0, 100.0), (40.0, 160.0)).expect("commit");
    let h = &update.markup.highlights(1)[0];
    assert_eq!((h.x, h.y, h.width, h.height), (40.0, 100.0, 60.0, 60.0));
}

#[test]
fn undo_is_lifo_across_pages() {
    let (mut engine, mut renderer) = engine(3);

    let h1 = drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("h1").markup.highlights(1)[0].id;
    turn_to(&mut engine, &mut renderer, 2);
    let h2 = drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("h2").markup.highlights(2)[0].id;
    turn_to(&mut engine, &mut renderer, 1);
    drag(&mut engine, (100.0, 100.0), (150.0, 150.0)).expect("h3");
    turn_to(&mut engine, &mut renderer, 3);

    let first = engine.undo().expect("undo h3");
    assert_eq!((first.reason, first.page), (UpdateReason::Undo, 1));
    assert_eq!(first.markup.highlights(1).iter().map(|h| h.id).collect::<Vec<_>>(), vec![h1]);

    let second = engine.undo().expect("undo h2");
    assert_eq!(second.page, 2);
    assert!(second.markup.find_highlight(2, h2).is_none());

    let third = engine.undo().expect("undo h1");
    assert_eq!(third.page, 1);
    assert!(third.markup.is_empty());

    assert!(engine.undo().is_none());
    assert_eq!(engine.page(), 3);
}

#[test]
fn undo_never_touches_annotations() {
    let (mut engine, _) = engine(1);
    engine.double_click(pt(300.0, 300.0));
    engine.marker_action(MarkerAction::SetDraft { text: "count".into() });
    engine.marker_action(MarkerAction::Save);

    assert!(engine.undo().is_none());
    assert_eq!(engine.markup().annotations(1).len(), 1);
}

#[test]
fn delete_mode_removal_purges_undo_entry() {
    let (mut engine, _) = engine(1);
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("h1");
    let h2 = drag(&mut engine, (200.0, 200.0), (260.0, 260.0)).expect("h2").markup.highlights(1)[1].id;

    engine.set_mode(InteractionMode::Delete);
    assert_eq!(engine.active_tag(), None);
    let deleted = engine.click(pt(20.0, 20.0), PointerTarget::Surface).expect("delete h1");
    assert_eq!(deleted.reason, UpdateReason::HighlightDeleted);
    assert_eq!(engine.undo_log().len(), 1);

    let undone = engine.undo().expect("undo h2");
    assert!(undone.markup.find_highlight(1, h2).is_none());
    assert!(undone.markup.is_empty());
    assert!(engine.undo().is_none());
}

#[test]
fn delete_mode_click_on_empty_surface_does_nothing() {
    let (mut engine, _) = engine(1);
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("h1");
    engine.toggle_delete_mode();

    let before = engine.markup().clone();
    assert!(engine.click(pt(400.0, 400.0), PointerTarget::Surface).is_none());
    assert!(drag(&mut engine, (300.0, 300.0), (400.0, 400.0)).is_none());
    assert_eq!(engine.markup(), &before);
}

#[test]
fn clear_page_is_page_scoped() {
    let (mut engine, mut renderer) = engine(2);
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("p1 highlight");
    engine.double_click(pt(300.0, 300.0));
    engine.marker_action(MarkerAction::SetDraft { text: "rit.".into() });
    engine.marker_action(MarkerAction::Save);

    turn_to(&mut engine, &mut renderer, 2);
    let p2 = drag(&mut engine, (10.0, 10.0), (50.0, 50.0)).expect("p2").markup.highlights(2)[0].clone();
    turn_to(&mut engine, &mut renderer, 1);

    assert!(engine.can_clear_page());
    let cleared = engine.clear_page().expect("clear");
    assert_eq!(cleared.reason, UpdateReason::PageCleared);
    assert!(cleared.markup.is_page_empty(1));
    assert_eq!(cleared.markup.highlights(2), &[p2.clone()]);
    assert_eq!(engine.undo_log().len(), 1);
    assert!(!engine.can_clear_page());
    assert!(engine.clear_page().is_none());

    let undone = engine.undo().expect("undo p2 highlight");
    assert_eq!(undone.page, 2);
    assert!(undone.markup.is_empty());
}

#[test]
fn serialized_markup_rehydrates_with_empty_undo_log() {
    let (mut engine, mut renderer) = engine(2);
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0));
    drag(&mut engine, (60.0, 60.0), (90.0, 90.0));
    turn_to(&mut engine, &mut renderer, 2);
    engine.double_click(pt(100.0, 100.0));
    engine.marker_action(MarkerAction::SetDraft { text: "breath".into() });
    engine.marker_action(MarkerAction::Save);

    let json = engine.markup().to_json().expect("serialize");
    let restored = MarkupStore::from_json(&json).expect("deserialize");

    let (mut fresh, _) = self::engine(2);
    fresh.hydrate(restored);
    assert_eq!(fresh.markup(), engine.markup());
    assert_eq!(fresh.markup().highlights(1)[0].x, 10.0);
    assert_eq!(fresh.markup().highlights(1)[1].x, 60.0);
    assert!(!fresh.can_undo());
    assert!(fresh.undo().is_none());
}

#[test]
fn never_saved_annotation_leaves_no_residue() {
    let (mut engine, mut renderer) = engine(2);
    let baseline = engine.markup().clone();

    let created = engine.double_click(pt(120.0, 80.0)).expect("created");
    let note = &created.markup.annotations(1)[0];
    assert_eq!((note.x, note.y, note.text.as_str()), (110.0, 70.0, ""));
    assert!(engine.click_outside().is_some());
    assert_eq!(engine.markup(), &baseline);

    engine.double_click(pt(120.0, 80.0));
    engine.marker_action(MarkerAction::Cancel);
    assert_eq!(engine.markup(), &baseline);

    engine.double_click(pt(120.0, 80.0));
    engine.marker_action(MarkerAction::SetDraft { text: "   ".into() });
    engine.marker_action(MarkerAction::Save);
    assert_eq!(engine.markup(), &baseline);

    engine.double_click(pt(120.0, 80.0));
    turn_to(&mut engine, &mut renderer, 2);
    assert_eq!(engine.markup(), &baseline);
    assert!(engine.open_marker().is_none());
}

#[test]
fn saved_annotation_survives_close_and_delete_removes_it() {
    let (mut engine, _) = engine(1);
    engine.double_click(pt(50.0, 50.0));
    engine.marker_action(MarkerAction::SetDraft { text: "  crescendo ".into() });
    let saved = engine.marker_action(MarkerAction::Save).expect("saved");
    assert_eq!(saved.reason, UpdateReason::AnnotationUpdated);
    assert_eq!(saved.markup.annotations(1)[0].text, "crescendo");

    engine.click(pt(45.0, 45.0), PointerTarget::Surface);
    assert!(engine.click_outside().is_none());
    assert_eq!(engine.markup().annotations(1).len(), 1);

    engine.click(pt(45.0, 45.0), PointerTarget::Surface);
    engine.marker_action(MarkerAction::Edit);
    engine.marker_action(MarkerAction::SetDraft { text: "decrescendo".into() });
    engine.marker_action(MarkerAction::Save);
    assert_eq!(engine.markup().annotations(1)[0].text, "decrescendo");

    engine.click(pt(45.0, 45.0), PointerTarget::Surface);
    let deleted = engine.marker_action(MarkerAction::Delete).expect("deleted");
    assert_eq!(deleted.reason, UpdateReason::AnnotationDeleted);
    assert!(deleted.markup.is_empty());
}

#[test]
fn double_click_works_in_delete_mode() {
    let (mut engine, _) = engine(1);
    engine.set_mode(InteractionMode::Delete);
    let update = engine.double_click(pt(200.0, 200.0)).expect("created");
    assert_eq!(update.reason, UpdateReason::AnnotationAdded);
    assert!(engine.open_marker().is_some());
}

#[test]
fn pointer_down_over_open_editor_does_not_draw() {
    let (mut engine, _) = engine(1);
    engine.double_click(pt(200.0, 200.0));
    assert!(!engine.pointer_down(pt(210.0, 230.0), PointerTarget::Editor));
    assert!(engine.pointer_up(pt(300.0, 300.0)).is_none());
    assert!(engine.click(pt(210.0, 230.0), PointerTarget::Editor).is_none());
    assert!(engine.open_marker().is_some());
}

#[test]
fn tag_change_does_not_recolor_existing_highlights() {
    let (mut engine, _) = engine(1);
    engine.select_tag(Some("difficult".into()));
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0));
    engine.select_tag(Some("practice".into()));
    drag(&mut engine, (60.0, 60.0), (90.0, 90.0));

    let highlights = engine.markup().highlights(1);
    assert_eq!(highlights[0].fill_color, "rgba(255, 58, 58, 0.25)");
    assert_eq!(highlights[1].fill_color, "rgba(101, 119, 255, 0.25)");
}

#[test]
fn navigation_clamps_and_abandons_drag() {
    let (mut engine, mut renderer) = engine(2);
    assert!(engine.prev_page().is_none());
    assert_eq!(engine.page(), 1);

    engine.pointer_down(pt(10.0, 10.0), PointerTarget::Surface);
    engine.pointer_move(pt(80.0, 80.0));
    engine.next_page();
    assert!(engine.pending_highlight().is_none());
    assert!(!engine.is_interactive());

    engine.render_with(&mut renderer).expect("render");
    assert!(engine.pointer_up(pt(80.0, 80.0)).is_none());
    engine.next_page();
    assert_eq!(engine.page(), 2);
    assert_eq!(engine.page_label(), "Page 2 / 2");
    assert!(engine.markup().is_empty());
}

#[test]
fn rerender_mid_drag_commits_nothing() {
    let (mut engine, mut renderer) = engine(1);

    engine.pointer_down(pt(10.0, 10.0), PointerTarget::Surface);
    engine.pointer_move(pt(80.0, 80.0));
    engine.request_render().expect("render ticket");
    assert!(engine.pending_highlight().is_none());
    assert!(engine.pointer_up(pt(80.0, 80.0)).is_none());

    engine.pointer_down(pt(10.0, 10.0), PointerTarget::Surface);
    engine.pointer_move(pt(80.0, 80.0));
    engine.request_render().expect("render ticket");
    assert!(engine.pointer_leave().is_none());

    engine.render_with(&mut renderer).expect("render");
    assert!(engine.pointer_up(pt(80.0, 80.0)).is_none());
    assert!(engine.markup().is_empty());
    assert!(!engine.can_undo());
}

#[test]
fn cancel_while_editing_saved_annotation_keeps_text_and_collapses() {
    let (mut engine, _) = engine(1);
    engine.double_click(pt(50.0, 50.0));
    engine.marker_action(MarkerAction::SetDraft { text: "dolce".into() });
    engine.marker_action(MarkerAction::Save);
    let id = engine.markup().annotations(1)[0].id;

    engine.click(pt(45.0, 45.0), PointerTarget::Surface);
    engine.marker_action(MarkerAction::Edit);
    engine.marker_action(MarkerAction::SetDraft { text: "agitato".into() });
    assert!(engine.marker_action(MarkerAction::Cancel).is_none());

    assert!(engine.open_marker().is_none());
    assert_eq!(engine.marker_phase(id), Some(MarkerPhase::SavedCollapsed));
    assert_eq!(engine.markup().annotations(1)[0].text, "dolce");
}

#[test]
fn document_change_resets_page_and_undo_but_keeps_markup() {
    let (mut engine, mut renderer) = engine(3);
    turn_to(&mut engine, &mut renderer, 3);
    drag(&mut engine, (10.0, 10.0), (50.0, 50.0));
    assert!(engine.can_undo());

    let mut other = self::renderer(5);
    let pages = engine.load_with(&mut other, DocumentHandle::new(2)).expect("reload");
    assert_eq!(pages, 5);
    assert_eq!(engine.page(), 1);
    assert!(!engine.can_undo());
    assert_eq!(engine.markup().highlight_count(), 1);
}
