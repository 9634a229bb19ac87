pub mod video_analysis_results;
