//! WASM tests for the JavaScript-facing `SqlEditor`.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

use sqlpad_editor_js::SqlEditor;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount_point(id: &str) -> web_sys::Element {
    let element = document().create_element("div").unwrap();
    element.set_id(id);
    document().body().unwrap().append_child(&element).unwrap();
    element
}

fn params(code: &str, readonly: bool) -> js_sys::Object {
    let params = js_sys::Object::new();
    js_sys::Reflect::set(&params, &"code".into(), &code.into()).unwrap();
    js_sys::Reflect::set(&params, &"readonly".into(), &readonly.into()).unwrap();
    params
}

/// Attach a recording callback at `params[name]`.
fn record(params: &js_sys::Object, name: &str) -> (Rc<RefCell<Vec<String>>>, Closure<dyn FnMut(String)>) {
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = seen.clone();
    let closure = Closure::<dyn FnMut(String)>::new(move |text: String| {
        sink.borrow_mut().push(text);
    });
    js_sys::Reflect::set(params, &name.into(), closure.as_ref().unchecked_ref()).unwrap();
    (seen, closure)
}

#[wasm_bindgen_test]
fn test_render_lifecycle() {
    let element = mount_point("js-lifecycle");
    let mut editor = SqlEditor::new("#js-lifecycle");

    assert!(!editor.is_live());
    assert_eq!(editor.render(params("SELECT 1", false).into()).unwrap(), "created");
    assert!(editor.is_live());
    assert_eq!(editor.get_document().unwrap().as_deref(), Some("SELECT 1"));

    assert_eq!(editor.render(params("SELECT 1", true).into()).unwrap(), "unchanged");
    assert_eq!(editor.render(params("SELECT 2", true).into()).unwrap(), "recreated");
    assert_eq!(element.query_selector_all(".sqlpad-editor").unwrap().length(), 1);

    editor.unmount().unwrap();
    assert!(!editor.is_live());
    assert_eq!(editor.get_document().unwrap(), None);
    assert_eq!(element.query_selector_all(".sqlpad-editor").unwrap().length(), 0);
    editor.unmount().unwrap();

    element.remove();
}

#[wasm_bindgen_test]
fn test_render_without_params() {
    let element = mount_point("js-empty");
    let mut editor = SqlEditor::new("#js-empty");
    assert_eq!(editor.render(JsValue::UNDEFINED).unwrap(), "created");
    assert_eq!(editor.get_document().unwrap().as_deref(), Some(""));
    editor.unmount().unwrap();
    element.remove();
}

#[wasm_bindgen_test]
fn test_execute_query_calls_back() {
    let element = mount_point("js-execute");
    let mut editor = SqlEditor::new("#js-execute");

    let render_params = params("SELECT now()", true);
    let (seen, _closure) = record(&render_params, "onExecuteQuery");
    editor.render(render_params.into()).unwrap();

    assert!(editor.execute_query().unwrap());
    assert_eq!(*seen.borrow(), vec!["SELECT now()".to_string()]);

    editor.render(params("SELECT now()", true).into()).unwrap();
    assert!(!editor.execute_query().unwrap());

    editor.unmount().unwrap();
    element.remove();
}

#[wasm_bindgen_test]
fn test_missing_mount_is_an_error() {
    let mut editor = SqlEditor::new("#js-nowhere");
    assert!(editor.render(params("", false).into()).is_err());
    assert!(!editor.is_live());
}

#[wasm_bindgen_test]
fn test_settings_recreate_on_next_render() {
    let element = mount_point("js-settings");
    let mut editor = SqlEditor::new("#js-settings");
    editor.render(params("SELECT 1", false).into()).unwrap();

    let mut settings = editor.get_settings().unwrap();
    assert!(settings.line_numbers);
    settings.line_numbers = false;
    editor.set_settings(settings).unwrap();
    assert!(!editor.get_settings().unwrap().line_numbers);

    assert_eq!(editor.render(params("SELECT 1", false).into()).unwrap(), "recreated");
    editor.unmount().unwrap();
    element.remove();
}
