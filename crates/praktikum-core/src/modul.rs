//! Module routing table: practicum id → module folder name.

use std::collections::BTreeMap;

use crate::record::PraktikumId;

/// Folder used for practicums without a module of their own.
pub const FALLBACK_FOLDER: &str = "empty_modul";

const DEFAULT_FOLDERS: [(PraktikumId, &str); 5] = [
  (5, "prak-sbd"),
  (6, "prak-mulmed"),
  (7, "prak-pjk"),
  (9, "prak-eldas"),
  (12, "prak-sdl"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulMap {
  folders: BTreeMap<PraktikumId, String>,
}

impl Default for ModulMap {
  fn default() -> Self {
    Self {
      folders: DEFAULT_FOLDERS
        .iter()
        .map(|(id, folder)| (*id, (*folder).to_owned()))
        .collect(),
    }
  }
}

impl ModulMap {
  /// The default table with `overrides` applied on top. Keys are practicum
  /// ids as strings, as they arrive from a config file.
  pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, String>
  where
    I: IntoIterator<Item = (&'a String, &'a String)>,
  {
    let mut map = Self::default();
    for (id, folder) in overrides {
      let id: PraktikumId = id
        .trim()
        .parse()
        .map_err(|_| format!("module key {id:?} is not a practicum id"))?;
      map.folders.insert(id, folder.clone());
    }
    Ok(map)
  }

  pub fn folder(&self, praktikum_id: PraktikumId) -> &str {
    self
      .folders
      .get(&praktikum_id)
      .map_or(FALLBACK_FOLDER, String::as_str)
  }

  /// The frontend path a practicum's module page resolves to.
  pub fn path(&self, praktikum_id: PraktikumId) -> String {
    format!("/praktikum/{praktikum_id}/modul/{}", self.folder(praktikum_id))
  }
}
