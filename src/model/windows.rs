//! Window stack and the visibility rules derived from it

/// Display mode of a window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowType {
    Full,
    Split,
    CoverFlow,
}

/// A registered view instance. Only its type and stack position matter here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub id: String,
    pub kind: WindowType,
}

impl Window {
    pub fn new(id: impl Into<String>, kind: WindowType) -> Self {
        Self { id: id.into(), kind }
    }
}

/// What each rendering surface shows, derived from the stack on demand.
///
/// Callers must not register more than one cover-flow window; only the first
/// one is ever selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowLayout<'a> {
    pub split: Vec<&'a Window>,
    pub full: Vec<&'a Window>,
    pub cover_flow: Option<&'a Window>,
    /// Split-screen menu indicator is hidden while any full window exists
    pub menu_hidden: bool,
    /// Split and full surfaces are hidden while cover flow is up
    pub all_hidden: bool,
}

impl<'a> WindowLayout<'a> {
    pub fn derive<I>(windows: I) -> Self
    where
        I: IntoIterator<Item = &'a Window>,
    {
        let mut split = Vec::new();
        let mut full = Vec::new();
        let mut cover_flow = None;

        for window in windows {
            match window.kind {
                WindowType::Split => split.push(window),
                WindowType::Full => full.push(window),
                WindowType::CoverFlow => {
                    if cover_flow.is_none() {
                        cover_flow = Some(window);
                    }
                }
            }
        }

        Self {
            menu_hidden: !full.is_empty(),
            all_hidden: cover_flow.is_some(),
            split,
            full,
            cover_flow,
        }
    }

    /// The window that receives wheel input: cover flow when present, then
    /// the latest full window, then the latest split window
    pub fn focused(&self) -> Option<&'a Window> {
        self.cover_flow
            .or_else(|| self.full.last().copied())
            .or_else(|| self.split.last().copied())
    }
}

/// Ordered collection of registered windows, oldest first. Each window
/// carries the view state `V` of whatever is mounted in it.
#[derive(Clone, Debug)]
pub struct WindowStack<V> {
    entries: Vec<(Window, V)>,
}

impl<V> Default for WindowStack<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> WindowStack<V> {
    pub fn push(&mut self, window: Window, view: V) {
        tracing::debug!(id = %window.id, kind = ?window.kind, "Window registered");
        self.entries.push((window, view));
    }

    /// Deregister a window; its view state is dropped with it
    pub fn remove(&mut self, id: &str) -> Option<V> {
        let index = self.entries.iter().position(|(w, _)| w.id == id)?;
        tracing::debug!(id, "Window removed");
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.entries.iter().map(|(w, _)| w)
    }

    pub fn layout(&self) -> WindowLayout<'_> {
        WindowLayout::derive(self.windows())
    }

    pub fn view(&self, id: &str) -> Option<&V> {
        self.entries.iter().find(|(w, _)| w.id == id).map(|(_, v)| v)
    }

    pub fn view_mut(&mut self, id: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(w, _)| w.id == id)
            .map(|(_, v)| v)
    }

    pub fn views_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Id of the window that receives input
    pub fn focused_id(&self) -> Option<String> {
        self.layout().focused().map(|w| w.id.clone())
    }
}
