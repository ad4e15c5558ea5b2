//! Widget event routing
//!
//! Widget ids are compound paths:
//!
//! ```text
//! {namespace}~{page}~{action}[:{sub_action}][~{data}]
//! ```
//!
//! A [`Router`] keeps one table for `released` events and one for everything
//! else. Tables are keyed by page, then by action. An action is either a leaf
//! handler or a [`Branch`] keyed by sub-action with an optional fallback.
//! Anything that does not resolve is dropped silently.

pub mod press;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetPhase {
    Pressed,
    Released,
    Clicked,
    Changed,
}

impl FromStr for WidgetPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pressed" => Ok(Self::Pressed),
            "released" => Ok(Self::Released),
            "clicked" => Ok(Self::Clicked),
            "changed" => Ok(Self::Changed),
            other => Err(format!("unknown widget phase `{other}`")),
        }
    }
}

impl fmt::Display for WidgetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
            Self::Clicked => "clicked",
            Self::Changed => "changed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEvent {
    pub widget_id: String,
    pub phase: WidgetPhase,
    pub value: String,
    pub peripheral_id: Option<String>,
}

impl WidgetEvent {
    pub fn new(widget_id: impl Into<String>, phase: WidgetPhase, value: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            phase,
            value: value.into(),
            peripheral_id: None,
        }
    }
}

/// Borrowed view of a parsed widget id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetPath<'a> {
    pub namespace: &'a str,
    pub page: &'a str,
    pub action: &'a str,
    pub sub_action: Option<&'a str>,
    pub data: Option<&'a str>,
}

impl<'a> WidgetPath<'a> {
    /// `None` unless the id has at least namespace, page and action
    pub fn parse(widget_id: &'a str) -> Option<Self> {
        let mut parts = widget_id.splitn(4, '~');
        let namespace = parts.next()?;
        let page = parts.next()?;
        let action_part = parts.next()?;
        let data = parts.next();

        let (action, sub_action) = match action_part.split_once(':') {
            Some((action, sub_action)) => (action, Some(sub_action)),
            None => (action_part, None),
        };

        Some(Self {
            namespace,
            page,
            action,
            sub_action,
            data,
        })
    }
}

/// Handlers keyed by sub-action, with an optional catch-all
#[derive(Debug, Clone)]
pub struct Branch<H> {
    children: HashMap<String, H>,
    fallback: Option<H>,
}

impl<H> Default for Branch<H> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            fallback: None,
        }
    }
}

impl<H> Branch<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, sub_action: &str, handler: H) -> Self {
        self.children.insert(sub_action.to_string(), handler);
        self
    }

    pub fn fallback(mut self, handler: H) -> Self {
        self.fallback = Some(handler);
        self
    }

    fn lookup(&self, sub_action: &str) -> Option<&H> {
        self.children.get(sub_action).or(self.fallback.as_ref())
    }
}

#[derive(Debug, Clone)]
pub enum RouteNode<H> {
    Leaf(H),
    Branch(Branch<H>),
}

type Table<H> = HashMap<String, HashMap<String, RouteNode<H>>>;

/// Handler resolved for one event, with the parsed path it was reached by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch<'a, H> {
    pub handler: &'a H,
    pub path: WidgetPath<'a>,
}

#[derive(Debug, Clone)]
pub struct Router<H> {
    namespaces: HashSet<String>,
    pressed: Table<H>,
    released: Table<H>,
}

impl<H> Router<H> {
    pub fn new<'n>(namespaces: impl IntoIterator<Item = &'n str>) -> Self {
        Self {
            namespaces: namespaces.into_iter().map(str::to_string).collect(),
            pressed: HashMap::new(),
            released: HashMap::new(),
        }
    }

    pub fn on_pressed(mut self, page: &str, action: &str, node: RouteNode<H>) -> Self {
        insert(&mut self.pressed, page, action, node);
        self
    }

    pub fn on_released(mut self, page: &str, action: &str, node: RouteNode<H>) -> Self {
        insert(&mut self.released, page, action, node);
        self
    }

    pub fn owns(&self, path: &WidgetPath<'_>) -> bool {
        self.namespaces.contains(path.namespace)
    }

    pub fn resolve<'a>(&'a self, event: &'a WidgetEvent) -> Option<Dispatch<'a, H>> {
        let table = match event.phase {
            WidgetPhase::Clicked => return None,
            WidgetPhase::Released => &self.released,
            WidgetPhase::Pressed | WidgetPhase::Changed => &self.pressed,
        };

        let path = WidgetPath::parse(&event.widget_id)?;
        if !self.owns(&path) {
            return None;
        }

        let handler = match table.get(path.page)?.get(path.action)? {
            RouteNode::Leaf(handler) => handler,
            RouteNode::Branch(branch) => branch.lookup(path.sub_action?)?,
        };
        Some(Dispatch { handler, path })
    }
}

fn insert<H>(table: &mut Table<H>, page: &str, action: &str, node: RouteNode<H>) {
    table
        .entry(page.to_string())
        .or_default()
        .insert(action.to_string(), node);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Handler {
        Select,
        Add,
        Reset,
        MatrixDefault,
        Arm,
        Help,
    }

    fn router() -> Router<Handler> {
        Router::new(["dop", "dopm"])
            .on_released("Presets", "Select", RouteNode::Leaf(Handler::Select))
            .on_pressed("Presets", "Select", RouteNode::Leaf(Handler::Arm))
            .on_released(
                "Maker",
                "Matrix",
                RouteNode::Branch(
                    Branch::new()
                        .on("Add", Handler::Add)
                        .on("Reset", Handler::Reset)
                        .fallback(Handler::MatrixDefault),
                ),
            )
            .on_released(
                "Config",
                "DisplayName",
                RouteNode::Branch(Branch::new().on("Help", Handler::Help)),
            )
    }

    fn resolve(router: &Router<Handler>, id: &str, phase: WidgetPhase) -> Option<Handler> {
        let event = WidgetEvent::new(id, phase, "");
        router.resolve(&event).map(|dispatch| *dispatch.handler)
    }

    #[test]
    fn test_parse_full_path() {
        let path = WidgetPath::parse("dop~Presets~Select:Single~3:Room A").unwrap();
        assert_eq!(path.namespace, "dop");
        assert_eq!(path.page, "Presets");
        assert_eq!(path.action, "Select");
        assert_eq!(path.sub_action, Some("Single"));
        assert_eq!(path.data, Some("3:Room A"));

        let path = WidgetPath::parse("dopm~Config~DisplayName:Edit~2").unwrap();
        assert_eq!(path.data, Some("2"));
        assert!(WidgetPath::parse("dop~Presets").is_none());
    }

    #[test]
    fn test_phase_selects_table() {
        let router = router();
        assert_eq!(resolve(&router, "dop~Presets~Select", WidgetPhase::Released), Some(Handler::Select));
        assert_eq!(resolve(&router, "dop~Presets~Select", WidgetPhase::Pressed), Some(Handler::Arm));
        assert_eq!(resolve(&router, "dop~Presets~Select", WidgetPhase::Changed), Some(Handler::Arm));
        assert_eq!(resolve(&router, "dop~Presets~Select", WidgetPhase::Clicked), None);
    }

    #[test]
    fn test_leaf_receives_sub_action() {
        let router = router();
        let event = WidgetEvent::new("dop~Presets~Select:Single~0:A", WidgetPhase::Released, "");
        let dispatch = router.resolve(&event).unwrap();
        assert_eq!(*dispatch.handler, Handler::Select);
        assert_eq!(dispatch.path.sub_action, Some("Single"));
    }

    #[test]
    fn test_unknown_sub_action_uses_fallback() {
        let router = router();
        assert_eq!(resolve(&router, "dopm~Maker~Matrix:Add", WidgetPhase::Released), Some(Handler::Add));
        assert_eq!(
            resolve(&router, "dopm~Maker~Matrix:Bogus", WidgetPhase::Released),
            Some(Handler::MatrixDefault)
        );
    }

    #[test]
    fn test_unknown_sub_action_without_fallback_is_dropped() {
        let router = router();
        assert_eq!(resolve(&router, "dopm~Config~DisplayName:Bogus", WidgetPhase::Released), None);
        assert_eq!(resolve(&router, "dopm~Config~DisplayName", WidgetPhase::Released), None);
        assert_eq!(resolve(&router, "dopm~Maker~Matrix", WidgetPhase::Released), None);
    }

    #[test]
    fn test_foreign_and_unknown_ids_are_dropped() {
        let router = router();
        assert_eq!(resolve(&router, "other~Presets~Select", WidgetPhase::Released), None);
        assert_eq!(resolve(&router, "dop~Nowhere~Select", WidgetPhase::Released), None);
        assert_eq!(resolve(&router, "dop~Presets~Nothing", WidgetPhase::Released), None);
        assert_eq!(resolve(&router, "garbage", WidgetPhase::Released), None);
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("Released".parse::<WidgetPhase>(), Ok(WidgetPhase::Released));
        assert!("held".parse::<WidgetPhase>().is_err());
    }
}
