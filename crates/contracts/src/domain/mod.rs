pub mod a001_backorder;
