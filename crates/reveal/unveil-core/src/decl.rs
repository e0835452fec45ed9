//! Declarative element registrations, as produced by scanning page markup
//! (`data-reveal`, `data-count`, `data-parallax` style attributes).

use serde::{Deserialize, Serialize};

use crate::counter::CounterOptions;
use crate::geometry::Rect;
use crate::parallax::ParallaxOptions;
use crate::reveal::RevealOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementDecl {
    pub element: String,
    pub rect: Rect,
    #[serde(flatten)]
    pub kind: DeclKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Reveal {
        /// Declarations sharing a group name form one staggered sibling group,
        /// ordered as they appear. The first member's options apply to the group.
        #[serde(default)]
        group: Option<String>,
        #[serde(default)]
        options: Option<RevealOptions>,
    },
    Counter {
        target: i64,
        #[serde(default)]
        options: Option<CounterOptions>,
    },
    Parallax {
        #[serde(default)]
        options: Option<ParallaxOptions>,
    },
}

impl ElementDecl {
    pub fn reveal(element: impl Into<String>, rect: Rect) -> Self {
        Self {
            element: element.into(),
            rect,
            kind: DeclKind::Reveal {
                group: None,
                options: None,
            },
        }
    }

    pub fn in_group(mut self, name: impl Into<String>) -> Self {
        if let DeclKind::Reveal { group, .. } = &mut self.kind {
            *group = Some(name.into());
        }
        self
    }

    pub fn counter(element: impl Into<String>, rect: Rect, target: i64) -> Self {
        Self {
            element: element.into(),
            rect,
            kind: DeclKind::Counter {
                target,
                options: None,
            },
        }
    }

    pub fn parallax(element: impl Into<String>, rect: Rect) -> Self {
        Self {
            element: element.into(),
            rect,
            kind: DeclKind::Parallax { options: None },
        }
    }
}
