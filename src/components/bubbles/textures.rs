//! Bubble face images.
//!
//! Images load in the background. Until one is ready, or if it fails, the
//! bubble is drawn untextured.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::content::ItemId;

struct Texture {
	image: HtmlImageElement,
	failed: Rc<Cell<bool>>,
	_on_error: Closure<dyn FnMut()>,
}

#[derive(Default)]
pub struct TextureCache {
	textures: HashMap<ItemId, Texture>,
}

impl TextureCache {
	/// Start loading one image per item.
	pub fn load<'a>(sources: impl IntoIterator<Item = (ItemId, &'a str)>) -> Self {
		let mut textures = HashMap::new();
		for (id, url) in sources {
			let image = match HtmlImageElement::new() {
				Ok(image) => image,
				Err(err) => {
					warn!("folio-fx: cannot create image for {}: {:?}", id, err);
					continue;
				}
			};
			let failed = Rc::new(Cell::new(false));
			let failed_flag = failed.clone();
			let source = url.to_string();
			let on_error = Closure::<dyn FnMut()>::new(move || {
				if !failed_flag.replace(true) {
					warn!("folio-fx: texture {} failed to load, drawing untextured", source);
				}
			});
			image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
			image.set_src(url);
			textures.insert(
				id,
				Texture {
					image,
					failed,
					_on_error: on_error,
				},
			);
		}
		Self { textures }
	}

	/// The image for `id` if it finished loading.
	pub fn ready(&self, id: ItemId) -> Option<&HtmlImageElement> {
		let texture = self.textures.get(&id)?;
		let image = &texture.image;
		let usable = !texture.failed.get() && image.complete() && image.natural_width() > 0;
		usable.then_some(&texture.image)
	}
}

impl Drop for TextureCache {
	fn drop(&mut self) {
		for texture in self.textures.values() {
			texture.image.set_onerror(None);
		}
	}
}
