//! Picker entry descriptors
//!
//! Safe model of a picker entry. Strings are `'static` C strings so the
//! lowered [`RawPickerEntry`] can be handed to the picker without copying.

use core::ffi::{CStr, c_void};
use core::ptr;

use crate::protocol::{AudioBaseType, RawPickerEntry, SystemActionFn};

/// Flavour of the Reset NVRAM system entry, with the generic tool icon as fallback
pub const FLAVOUR_RESET_NVRAM: &CStr = c"ResetNVRAM:NVRAMTool";

/// Voice-over asset announcing the Reset NVRAM entry
pub const VOICE_OVER_RESET_NVRAM: &CStr = c"ResetNVRAM";

/// Voice-over asset reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOver {
    pub path: &'static CStr,
    pub base: AudioBaseType,
}

/// Picker entry descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerEntry {
    pub id: &'static CStr,
    pub name: &'static CStr,
    pub path: Option<&'static CStr>,
    pub arguments: Option<&'static CStr>,
    pub flavour: &'static CStr,
    /// Hidden unless the picker shows auxiliary entries
    pub auxiliary: bool,
    /// External tool rather than a system action
    pub tool: bool,
    pub text_mode: bool,
    pub real_path: bool,
    pub voice_over: Option<VoiceOver>,
}

impl PickerEntry {
    /// Create a visible, pathless entry
    pub const fn new(id: &'static CStr, name: &'static CStr, flavour: &'static CStr) -> Self {
        Self {
            id,
            name,
            path: None,
            arguments: None,
            flavour,
            auxiliary: false,
            tool: false,
            text_mode: false,
            real_path: false,
            voice_over: None,
        }
    }

    /// Mark the entry auxiliary
    pub const fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }

    /// Attach a voice-over asset
    pub const fn with_voice_over(mut self, path: &'static CStr, base: AudioBaseType) -> Self {
        self.voice_over = Some(VoiceOver { path, base });
        self
    }

    /// Lower into the picker record, binding `action` with `action_config`.
    ///
    /// `action_config` must stay valid for as long as the picker may invoke
    /// `action`.
    pub fn to_raw(&self, action: SystemActionFn, action_config: *mut c_void) -> RawPickerEntry {
        let (audio_base_path, audio_base_type) = match self.voice_over {
            Some(voice) => (voice.path.as_ptr(), voice.base),
            None => (ptr::null(), AudioBaseType::OpenCore),
        };

        RawPickerEntry {
            id: self.id.as_ptr(),
            name: self.name.as_ptr(),
            path: self.path.map_or(ptr::null(), CStr::as_ptr),
            arguments: self.arguments.map_or(ptr::null(), CStr::as_ptr),
            flavour: self.flavour.as_ptr(),
            auxiliary: self.auxiliary,
            tool: self.tool,
            text_mode: self.text_mode,
            real_path: self.real_path,
            system_action: Some(action),
            action_config,
            audio_base_path,
            audio_base_type,
        }
    }
}
