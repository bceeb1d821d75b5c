use super::*;

/// Click state shared by every listener along the dispatch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent<N> {
    pub target: N,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<N> ClickEvent<N> {
    pub fn new(target: N) -> Self {
        Self {
            target,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent<N> {
    Click(ClickEvent<N>),
    Resize,
}

impl<N> PageEvent<N> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click(_) => EventKind::Click,
            Self::Resize => EventKind::Resize,
        }
    }
}
