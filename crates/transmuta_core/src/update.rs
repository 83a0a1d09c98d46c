use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesAdded {
            files,
            submitted_at_ms,
        } => {
            let mut effects = Vec::new();
            for file in files {
                let (_item_id, preview) = state.admit_file(file, submitted_at_ms);
                if let Some((handle, bytes)) = preview {
                    effects.push(Effect::RegisterHandle { handle, bytes });
                }
            }
            effects
        }
        Msg::TargetChanged { item_id, format } => match state.change_target(item_id, &format) {
            // Invalid format, unknown id, or in-flight item: rejected, no-op.
            None => Vec::new(),
            Some(released) => released
                .map(|handle| Effect::ReleaseHandle { handle })
                .into_iter()
                .collect(),
        },
        Msg::FormatApplied { format, category } => state
            .apply_format_to_category(&format, category)
            .into_iter()
            .map(|handle| Effect::ReleaseHandle { handle })
            .collect(),
        Msg::ConvertClicked => {
            // Two-phase round start: every eligible item flips to Pending in
            // one state update, then each gets its own dispatch effect.
            let selected = state.select_for_round();
            selected
                .into_iter()
                .filter_map(|item_id| {
                    state.item(item_id).map(|item| Effect::Dispatch {
                        item_id,
                        source: item.source.clone(),
                        category: item.category,
                        target: item.target_format.clone(),
                    })
                })
                .collect()
        }
        Msg::ItemRemoved { item_id } => state
            .remove_item(item_id)
            .into_iter()
            .map(|handle| Effect::ReleaseHandle { handle })
            .collect(),
        Msg::Cleared => state
            .clear_items()
            .into_iter()
            .map(|handle| Effect::ReleaseHandle { handle })
            .collect(),
        Msg::ConversionStarted { item_id } => {
            state.begin_item(item_id);
            Vec::new()
        }
        Msg::ConversionProgressed { item_id, increment } => {
            state.advance_progress(item_id, increment);
            Vec::new()
        }
        Msg::ConversionFinished { item_id, result } => state
            .finish_item(item_id, result)
            .map(|(handle, bytes)| Effect::RegisterHandle { handle, bytes })
            .into_iter()
            .collect(),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
