mod controls;
mod panels;
