//! Backend-issued resource handles.
//!
//! Handles are plain slot indices; only the backend that issued one can
//! resolve it.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(u32);

/// Binding of a mesh's buffers to a program's attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutHandle(u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl ProgramHandle {
    pub fn new(index: u32) -> Self {
        ProgramHandle(index)
    }
    pub fn index(self) -> u32 {
        self.0
    }
}

impl MeshHandle {
    pub fn new(index: u32) -> Self {
        MeshHandle(index)
    }
    pub fn index(self) -> u32 {
        self.0
    }
}

impl LayoutHandle {
    pub fn new(index: u32) -> Self {
        LayoutHandle(index)
    }
    pub fn index(self) -> u32 {
        self.0
    }
}

impl TextureHandle {
    pub fn new(index: u32) -> Self {
        TextureHandle(index)
    }
    pub fn index(self) -> u32 {
        self.0
    }
}
