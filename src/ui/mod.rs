/// egui rendering: the top bar and filter panel, plus one central view per tab.
pub mod panels;
pub mod plot;
pub mod tables;
