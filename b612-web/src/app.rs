use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use b612_shared::Rgb;
use glam::Vec3;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, Event, HtmlAudioElement, HtmlElement};

use crate::audio::{Audio, AudioCue, CueHandle};
use crate::config::NarrativeConfig;
use crate::error::{Error, Result};
use crate::input::SourceKind;
use crate::narrative::Experience;
use crate::scene::{AnimationSpec, EntityId, Scene};

const START_BUTTON: &str = "start-button";
const START_SCREEN: &str = "start-screen";
const MAIN_SCENE: &str = "main-scene";

/// Browser events queued by listeners and applied on the next frame.
enum HostEvent {
    Start(u64),
    Pointer(EntityId, SourceKind, u64),
    AudioEnded(CueHandle, u64),
}

type Inbox = Rc<RefCell<VecDeque<HostEvent>>>;
type Listener = Closure<dyn FnMut(Event)>;

fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() as u64)
        .unwrap_or(0)
}

// ─── A-Frame attribute access ───────────────────────────────────────────

/// Call a method looked up on the element, so A-Frame's overrides of
/// `getAttribute`/`setAttribute` are the ones invoked.
fn call(el: &Element, method: &str, args: &[JsValue]) -> Option<JsValue> {
    let f = Reflect::get(el, &JsValue::from_str(method))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    let args: Array = args.iter().collect();
    f.apply(el, &args).ok()
}

fn get_component(el: &Element, name: &str) -> Option<JsValue> {
    call(el, "getAttribute", &[JsValue::from_str(name)])
        .filter(|v| !v.is_null() && !v.is_undefined())
}

fn set_component(el: &Element, name: &str, value: JsValue) {
    call(el, "setAttribute", &[JsValue::from_str(name), value]);
}

fn number_field(obj: &JsValue, field: &str) -> Option<f64> {
    let value = Reflect::get(obj, &JsValue::from_str(field)).ok()?;
    value
        .as_f64()
        .or_else(|| value.as_string().and_then(|s| s.trim().parse().ok()))
}

/// The page's A-Frame scene.
pub struct DomScene {
    document: Document,
    assigned: Cell<usize>,
}

impl DomScene {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            assigned: Cell::new(0),
        }
    }

    fn element(&self, id: &EntityId) -> Option<Element> {
        self.document.get_element_by_id(id.as_str())
    }
}

impl Scene for DomScene {
    fn exists(&self, id: &EntityId) -> bool {
        self.element(id).is_some()
    }

    fn color(&self, id: &EntityId) -> Option<Rgb> {
        let value = get_component(&self.element(id)?, "color")?;
        value.as_string()?.parse().ok()
    }

    fn set_color(&mut self, id: &EntityId, color: Rgb) {
        if let Some(el) = self.element(id) {
            set_component(&el, "color", JsValue::from_str(&color.to_hex()));
        }
    }

    fn light_intensity(&self, id: &EntityId) -> Option<f32> {
        let light = get_component(&self.element(id)?, "light")?;
        number_field(&light, "intensity").map(|v| v as f32)
    }

    fn set_light_intensity(&mut self, id: &EntityId, intensity: f32) {
        if let Some(el) = self.element(id) {
            call(
                &el,
                "setAttribute",
                &[
                    JsValue::from_str("light"),
                    JsValue::from_str("intensity"),
                    JsValue::from_f64(intensity as f64),
                ],
            );
        }
    }

    fn set_visible(&mut self, id: &EntityId, visible: bool) {
        if let Some(el) = self.element(id) {
            set_component(&el, "visible", JsValue::from_bool(visible));
        }
    }

    fn set_opacity(&mut self, id: &EntityId, opacity: f32) {
        if let Some(el) = self.element(id) {
            set_component(&el, "opacity", JsValue::from_f64(opacity as f64));
        }
    }

    fn position(&self, id: &EntityId) -> Option<Vec3> {
        let p = get_component(&self.element(id)?, "position")?;
        Some(Vec3::new(
            number_field(&p, "x")? as f32,
            number_field(&p, "y")? as f32,
            number_field(&p, "z")? as f32,
        ))
    }

    fn set_position(&mut self, id: &EntityId, position: Vec3) {
        if let Some(el) = self.element(id) {
            let value = format!("{} {} {}", position.x, position.y, position.z);
            set_component(&el, "position", JsValue::from_str(&value));
        }
    }

    fn animate(&mut self, id: &EntityId, spec: &AnimationSpec) {
        if let Some(el) = self.element(id) {
            set_component(&el, "animation", JsValue::from_str(&spec.to_attribute()));
        }
    }

    /// Matched elements without an id are given a unique one so later
    /// lookups work.
    fn query_all(&self, selector: &str) -> Vec<EntityId> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            log::warn!("Invalid selector {selector:?}");
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i)?.dyn_into::<Element>().ok())
            .map(|el| {
                if el.id().is_empty() {
                    let n = self.assigned.get();
                    self.assigned.set(n + 1);
                    el.set_id(&format!("b612-match-{n}"));
                }
                EntityId::new(el.id())
            })
            .collect()
    }
}

// ─── Audio ──────────────────────────────────────────────────────────────

struct Playing {
    element: HtmlAudioElement,
    on_ended: Closure<dyn FnMut()>,
}

/// One `HTMLAudioElement` per playing cue.
pub struct DomAudio {
    playing: HashMap<CueHandle, Playing>,
    inbox: Inbox,
}

impl DomAudio {
    fn new(inbox: Inbox) -> Self {
        Self {
            playing: HashMap::new(),
            inbox,
        }
    }

    /// Drop the element of a cue that finished on its own.
    fn release(&mut self, handle: CueHandle) {
        if let Some(playing) = self.playing.remove(&handle) {
            let _ = playing.element.remove_event_listener_with_callback(
                "ended",
                playing.on_ended.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Audio for DomAudio {
    fn play(&mut self, handle: CueHandle, cue: &AudioCue) -> Result<()> {
        let rejected = |e: JsValue| Error::Audio {
            clip: cue.clip.clone(),
            reason: format!("{e:?}"),
        };
        let element = HtmlAudioElement::new_with_src(&cue.clip).map_err(rejected)?;
        element.set_loop(cue.looping);
        element.set_volume(cue.volume as f64);

        let inbox = self.inbox.clone();
        let on_ended = Closure::<dyn FnMut()>::new(move || {
            inbox.borrow_mut().push_back(HostEvent::AudioEnded(handle, now_ms()));
        });
        element
            .add_event_listener_with_callback("ended", on_ended.as_ref().unchecked_ref())
            .map_err(rejected)?;

        let promise = element.play().map_err(rejected)?;
        let clip = cue.clip.clone();
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!(
                    "{}",
                    Error::Audio {
                        clip,
                        reason: format!("{e:?}"),
                    }
                );
            }
        });

        self.playing.insert(handle, Playing { element, on_ended });
        Ok(())
    }

    fn stop(&mut self, handle: CueHandle) {
        if let Some(playing) = self.playing.get(&handle) {
            let _ = playing.element.pause();
            playing.element.set_current_time(0.0);
        }
        self.release(handle);
    }

    fn set_volume(&mut self, handle: CueHandle, volume: f32) {
        if let Some(playing) = self.playing.get(&handle) {
            playing.element.set_volume(volume as f64);
        }
    }
}

// ─── App ────────────────────────────────────────────────────────────────

/// The running experience, driven from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct App {
    experience: Experience<DomScene, DomAudio>,
    inbox: Inbox,
    _listeners: Vec<Listener>,
}

impl App {
    pub fn new(config: NarrativeConfig) -> std::result::Result<App, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let inbox: Inbox = Rc::default();
        let mut listeners = Vec::new();

        // Built before the listeners: resolving selectors assigns element ids
        let scene = DomScene::new(document.clone());
        let audio = DomAudio::new(inbox.clone());
        let experience = Experience::new(config, scene, audio, now_ms());

        for target in experience.interactive_targets() {
            let Some(el) = document.get_element_by_id(target.as_str()) else {
                continue;
            };
            for source in [SourceKind::Pointer, SourceKind::VrTrigger] {
                let inbox = inbox.clone();
                let target = target.clone();
                let listener = Listener::new(move |_: Event| {
                    inbox
                        .borrow_mut()
                        .push_back(HostEvent::Pointer(target.clone(), source, now_ms()));
                });
                el.add_event_listener_with_callback(
                    source.label(),
                    listener.as_ref().unchecked_ref(),
                )?;
                listeners.push(listener);
            }
        }

        match document.get_element_by_id(START_BUTTON) {
            Some(button) => {
                let inbox = inbox.clone();
                let doc = document.clone();
                let listener = Listener::new(move |_: Event| {
                    inbox.borrow_mut().push_back(HostEvent::Start(now_ms()));
                    set_display(&doc, START_SCREEN, "none");
                    set_display(&doc, MAIN_SCENE, "block");
                });
                button
                    .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
                listeners.push(listener);
            }
            None => log::warn!("No #{START_BUTTON}; the experience will not start"),
        }

        Ok(App {
            experience,
            inbox,
            _listeners: listeners,
        })
    }
}

fn set_display(document: &Document, id: &str, display: &str) {
    let Some(el) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let _ = el.style().set_property("display", display);
}

#[wasm_bindgen]
impl App {
    /// Run one frame. Called from requestAnimationFrame.
    pub fn frame(&mut self, time: f64) {
        let events: Vec<HostEvent> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                HostEvent::Start(at) => {
                    self.experience.start(at);
                }
                HostEvent::Pointer(target, source, at) => {
                    self.experience.pointer(&target, source, at)
                }
                HostEvent::AudioEnded(handle, at) => {
                    self.experience.audio_ended(handle, at);
                    self.experience.audio_mut().release(handle);
                }
            }
        }
        self.experience.frame(time as u64);
    }

    /// Name of the visible world.
    pub fn world(&self) -> String {
        self.experience.world().label().to_string()
    }
}
